//! Record types (rule 19).
//!
//! Records relate only when they have the same shape: the same number of
//! positional fields and the same field names. Fields are then compared
//! covariantly, positional fields in order and named fields by name.

use crate::matcher::ConstraintMatcher;
use crate::ops::TypeSystemOps;
use crate::types::TypeId;

impl<O: TypeSystemOps + ?Sized> ConstraintMatcher<'_, O> {
    pub(crate) fn match_record_types(&mut self, p: TypeId, q: TypeId, left_schema: bool) -> bool {
        let ops = self.ops();
        let (Some((p_shape, p_nullability)), Some((q_shape, q_nullability))) =
            (ops.record_shape(p), ops.record_shape(q))
        else {
            return false;
        };
        if p_nullability.is_nullable() || q_nullability.is_nullable() {
            return false;
        }
        if p_shape.positional.len() != q_shape.positional.len()
            || p_shape.named.len() != q_shape.named.len()
            || p_shape
                .named
                .iter()
                .zip(&q_shape.named)
                .any(|(p_field, q_field)| p_field.name != q_field.name)
        {
            return false;
        }

        let mark = self.log().checkpoint();
        let positional = p_shape.positional.iter().zip(&q_shape.positional);
        let named = p_shape
            .named
            .iter()
            .zip(&q_shape.named)
            .map(|(p_field, q_field)| (&p_field.type_id, &q_field.type_id));
        for (&p_field, &q_field) in positional.chain(named) {
            if !self.match_types(p_field, q_field, left_schema) {
                self.rewind_to(mark);
                return false;
            }
        }
        true
    }
}

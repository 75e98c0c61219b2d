use crate::dynamics::ConstraintRow;

/// The system-level aggregation of constraint rows for one solver pass.
///
/// Links register their rows here each step, after their `update` recomputed
/// the Jacobians; the velocity solver then sweeps the registered rows in
/// insertion order. The descriptor borrows the rows mutably, so multipliers
/// computed by the solver land directly in the links that own the rows.
#[derive(Default)]
pub struct SystemDescriptor<'a> {
    constraints: Vec<&'a mut ConstraintRow>,
}

impl<'a> SystemDescriptor<'a> {
    /// Creates an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one constraint row.
    pub fn insert_constraint(&mut self, row: &'a mut ConstraintRow) {
        self.constraints.push(row);
    }

    /// The number of registered rows.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Returns `true` if no row was registered.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Iterates over the registered rows.
    pub fn rows(&self) -> impl Iterator<Item = &ConstraintRow> {
        self.constraints.iter().map(|c| &**c)
    }

    /// Iterates mutably over the registered rows.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut ConstraintRow> + use<'_, 'a> {
        self.constraints.iter_mut().map(|c| &mut **c)
    }

    /// Drops every registered row borrow.
    pub fn clear(&mut self) {
        self.constraints.clear();
    }
}

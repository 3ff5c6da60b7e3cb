//! Dialog lifecycle
//!
//! Dialogs move data between a model and their view state in four phases.
//! The host drives the first three through [`open_form`] and the last one
//! when the dialog is accepted or closed.

use tracing::debug;

/// A dialog controller bound to a model type
pub trait Form {
    type Model;

    /// Human-readable dialog name for logs
    fn name(&self) -> &'static str;

    /// Fill the lists the dialog offers
    fn init_lists(&mut self, model: &Self::Model);

    /// Copy model values into the view state
    fn model_to_view(&mut self, model: &Self::Model);

    /// Recompute enabled/visible flags from the view state
    fn update_ui(&mut self);

    /// Write the view state back into the model
    fn view_to_model(&mut self, model: &mut Self::Model);
}

/// Run the opening phases of a dialog
pub fn open_form<F: Form>(form: &mut F, model: &F::Model) {
    debug!(dialog = form.name(), "Opening dialog");
    form.init_lists(model);
    form.model_to_view(model);
    form.update_ui();
}

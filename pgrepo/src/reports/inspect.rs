use super::output::{Output, Report};

/// Pretty-printed JSON of a snapshot or plan.
#[derive(Debug)]
pub struct InspectReport {
    pub json: String,
}

impl Report for InspectReport {
    fn render(&self, out: &mut dyn Output) {
        out.preformatted(&self.json);
    }
}

//! Report data structures for commands.
//!
//! Operations build reports, commands render them to an [`Output`] target.

mod check;
mod generate;
mod inspect;
mod output;

pub use check::CheckReport;
pub use generate::{GenerateReport, GenerationResult, PreviewFile, PreviewResult, WrittenResult};
pub use inspect::InspectReport;
#[cfg(test)]
pub use output::Output;
pub use output::{Report, TerminalOutput};

#[cfg(test)]
pub(crate) mod testing {
    use super::Output;

    /// Records every call as a tagged line.
    #[derive(Default)]
    pub struct Recorder {
        pub lines: Vec<String>,
    }

    impl Recorder {
        pub fn text(&self) -> String {
            self.lines.join("\n")
        }
    }

    impl Output for Recorder {
        fn section(&mut self, name: &str) {
            self.lines.push(format!("[section] {}", name));
        }

        fn key_value(&mut self, key: &str, value: &str) {
            self.lines.push(format!("[kv] {}: {}", key, value));
        }

        fn list_item(&mut self, text: &str) {
            self.lines.push(format!("[item] {}", text));
        }

        fn added_item(&mut self, text: &str) {
            self.lines.push(format!("[added] {}", text));
        }

        fn warning(&mut self, msg: &str) {
            self.lines.push(format!("[warning] {}", msg));
        }

        fn error(&mut self, msg: &str) {
            self.lines.push(format!("[error] {}", msg));
        }

        fn divider(&mut self, label: &str) {
            self.lines.push(format!("[divider] {}", label));
        }

        fn preformatted(&mut self, text: &str) {
            self.lines.push(text.to_string());
        }

        fn newline(&mut self) {
            self.lines.push(String::new());
        }
    }
}

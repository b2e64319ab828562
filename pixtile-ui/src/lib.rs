//! pixtile-ui: display and input adapters around the editing core, plus PNG
//! output for the `pixtile` command line tool.

pub mod editor;
pub mod output;

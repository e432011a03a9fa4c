mod central_panel;
mod generation_panel;
mod tools_panel;

pub use central_panel::central_panel;
pub use generation_panel::generation_panel;
pub use tools_panel::tools_panel;

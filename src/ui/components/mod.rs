pub mod player;
pub mod sidebar;
pub mod spinner;
pub mod text_input;
pub mod toast;

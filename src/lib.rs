pub mod asset_gen;
pub mod builtin_font;
pub mod font;

pub mod deck;
pub mod grid;
pub mod input;
pub mod layout;
pub mod mode;
pub mod view;

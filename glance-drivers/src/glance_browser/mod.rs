pub mod behavioral;
pub mod document;
pub mod driver;
pub mod scripts;

mod button;
mod schematic;

pub use button::Button;
pub use schematic::Schematic;

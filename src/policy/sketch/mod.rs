mod doorkeeper;
mod frequency;

pub(crate) use doorkeeper::Doorkeeper;
pub(crate) use frequency::Cm4;

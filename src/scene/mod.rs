pub(crate) mod falling;
pub(crate) mod palette;
pub(crate) mod projector;
pub(crate) mod shooting;
pub(crate) mod stars;

pub use super::award::Entity as Award;
pub use super::lotteries::Entity as Lotteries;
pub use super::removeds::Entity as Removeds;

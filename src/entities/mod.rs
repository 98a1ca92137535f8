pub mod prelude;

pub mod award;
pub mod lotteries;
pub mod removeds;

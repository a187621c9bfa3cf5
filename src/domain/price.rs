/// Monthly price in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price(i32);

impl Price {
    pub fn parse(value: i32) -> Result<Price, String> {
        if value <= 0 {
            return Err(format!("{} is not a valid price, it must be positive", value));
        }

        Ok(Self(value))
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

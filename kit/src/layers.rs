use num_traits::{One, PrimInt, Zero};
use serde::{Deserialize, Serialize};

/// Trait implemented by collision-layer enums.
///
/// The enum's discriminant (via `#[repr(u8)]`) determines the bit index.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    /// Bit for this flag. Indices past the width of `Storage` map to no bit at all.
    fn mask(&self) -> Self::Storage {
        let index = u32::from(self.bit_index());
        if index >= Self::Storage::zero().count_zeros() {
            return Self::Storage::zero();
        }
        Self::Storage::one() << (index as usize)
    }
}

/// A set of flags packed into a primitive integer.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BitmaskFlags<T: PrimInt> {
    pub bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub fn new(bits: T) -> Self {
        Self { bits }
    }

    pub fn add<U: FlagBitmask<Storage = T>>(&mut self, flag: U) {
        self.bits = self.bits | flag.mask();
    }

    pub fn has<U: FlagBitmask<Storage = T>>(&self, flag: U) -> bool {
        (self.bits & flag.mask()) != T::zero()
    }

    pub fn add_many<U: FlagBitmask<Storage = T> + Copy>(&mut self, flags: &[U]) {
        for &flag in flags {
            self.add(flag);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bits == T::zero()
    }
}

/// Collision layers a query is allowed to hit. The empty mask hits nothing.
pub type LayerMask = BitmaskFlags<u32>;

impl LayerMask {
    pub const NONE: LayerMask = BitmaskFlags { bits: 0 };
    pub const ALL: LayerMask = BitmaskFlags { bits: u32::MAX };

    pub fn of<U: FlagBitmask<Storage = u32> + Copy>(flags: &[U]) -> Self {
        let mut mask = Self::NONE;
        mask.add_many(flags);
        mask
    }

    pub fn contains(&self, layer: Layer) -> bool {
        self.has(layer)
    }
}

/// A single collision layer (bit index `0..32`) carried by every surface.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layer(pub u8);

impl Layer {
    pub fn of<U: FlagBitmask<Storage = u32>>(flag: U) -> Self {
        Layer(flag.bit_index())
    }
}

impl FlagBitmask for Layer {
    type Storage = u32;

    fn bit_index(&self) -> u8 {
        self.0
    }
}

/// Declare a named collision-layer enum usable with [`LayerMask`].
///
/// Example:
/// ```rust
/// kit::define_layers!(LevelLayer, {
///     Ground,
///     Wall,
///     Enemy,
/// });
/// ```
#[macro_export]
macro_rules! define_layers {
    ($name:ident, { $($variant:ident),* $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(u8)]
        pub enum $name {
            $($variant),*
        }

        impl $crate::layers::FlagBitmask for $name {
            type Storage = u32;

            fn bit_index(&self) -> u8 {
                *self as u8
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::define_layers!(TestLayer, { Ground, Wall, Camera });

    #[test]
    fn mask_of_named_layers() {
        let mask = LayerMask::of(&[TestLayer::Ground, TestLayer::Camera]);
        assert_eq!(mask.bits, 0b101);
        assert!(mask.contains(Layer::of(TestLayer::Ground)));
        assert!(!mask.contains(Layer::of(TestLayer::Wall)));
    }

    #[test]
    fn empty_mask_matches_nothing() {
        assert!(LayerMask::NONE.is_empty());
        assert!(!LayerMask::NONE.contains(Layer(0)));
        assert!(LayerMask::ALL.contains(Layer(31)));
    }

    #[test]
    fn layers_past_bit_31_match_no_mask() {
        assert_eq!(Layer(32).mask(), 0);
        assert_eq!(Layer(255).mask(), 0);
        assert!(!LayerMask::ALL.contains(Layer(32)));
        assert!(!LayerMask::new(0b1).contains(Layer(32)));

        let mut mask = LayerMask::NONE;
        mask.add(Layer(40));
        assert!(mask.is_empty());
    }
}

// QOI color index: a 64-slot direct-mapped cache of recently seen pixels.
//
// The hash multipliers (3, 5, 7, 11) are part of the wire format.  Collisions
// overwrite silently; the table is a lossy cache, never a dictionary.

use super::pixel::Pixel;

/// Number of slots in the color index.
pub const INDEX_SIZE: usize = 64;

/// Fixed 64-slot pixel cache shared (by construction) between encoder and
/// decoder.
///
/// Every slot starts as [`Pixel::ZERO`].  Both sides must call
/// [`observe`](Self::observe) for the same pixels in the same order or INDEX
/// chunks resolve to the wrong pixel without any detectable error.
#[derive(Clone, Debug)]
pub struct ColorIndex {
    slots: [Pixel; INDEX_SIZE],
}

impl ColorIndex {
    pub fn new() -> Self {
        Self {
            slots: [Pixel::ZERO; INDEX_SIZE],
        }
    }

    /// Slot for `pixel`: `(r*3 + g*5 + b*7 + a*11) % 64`.
    #[inline]
    pub fn hash(pixel: Pixel) -> usize {
        let [r, g, b, a] = pixel.0.map(usize::from);
        (r * 3 + g * 5 + b * 7 + a * 11) % INDEX_SIZE
    }

    /// Store `pixel` in its slot, replacing the previous occupant.
    #[inline]
    pub fn observe(&mut self, pixel: Pixel) {
        self.slots[Self::hash(pixel)] = pixel;
    }

    /// Current occupant of `index` (masked to the table size).
    #[inline]
    pub fn lookup(&self, index: usize) -> Pixel {
        self.slots[index % INDEX_SIZE]
    }

    /// Return the slot if it already holds `pixel`, otherwise store `pixel`
    /// there and return `None`.
    #[inline]
    pub fn match_or_observe(&mut self, pixel: Pixel) -> Option<u8> {
        let slot = Self::hash(pixel);
        if self.slots[slot] == pixel {
            return Some(slot as u8);
        }
        self.slots[slot] = pixel;
        None
    }
}

impl Default for ColorIndex {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

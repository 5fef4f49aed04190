// src/extract/layout.rs
// =============================================================================
// Facts-section layouts.
//
// The facts section of a detail document lists its widgets in a fixed order,
// but some listings carry one optional widget ahead of the price widgets.
// That shifts the prices by one position. We classify the section by its
// widget count and refuse to guess when the count matches neither layout.
//
//   widgets   layout     total price   price per meter
//   7         Compact    widgets[1]    widgets[2]
//   8+        Extended   widgets[2]    widgets[3]
//   0-6       error      -             -
// =============================================================================

use super::ExtractError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactsLayout {
    /// Exactly 7 widgets: no optional widget
    Compact,
    /// 8 or more widgets: optional widget before the prices
    Extended,
}

// Widget positions of the two price values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSlots {
    pub total_price: usize,
    pub price_per_meter: usize,
}

impl FactsLayout {
    pub const COMPACT_WIDGETS: usize = 7;
    pub const EXTENDED_MIN_WIDGETS: usize = 8;

    // Picks the layout for a facts section
    //
    // Parameters:
    //   widget_count: length of sections[4].widgets
    //
    // Returns: Compact for 7, Extended for 8 or more,
    //          UnrecognizedLayout for anything smaller
    pub fn classify(widget_count: usize) -> Result<Self, ExtractError> {
        match widget_count {
            Self::COMPACT_WIDGETS => Ok(FactsLayout::Compact),
            n if n >= Self::EXTENDED_MIN_WIDGETS => Ok(FactsLayout::Extended),
            n => Err(ExtractError::UnrecognizedLayout { widgets: n }),
        }
    }

    // Where to read the prices for this layout
    pub fn price_slots(self) -> PriceSlots {
        match self {
            FactsLayout::Compact => PriceSlots {
                total_price: 1,
                price_per_meter: 2,
            },
            FactsLayout::Extended => PriceSlots {
                total_price: 2,
                price_per_meter: 3,
            },
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Can a const be used as a match pattern?
//    - Yes: `Self::COMPACT_WIDGETS =>` matches the value 7
//    - Giving it a name keeps the table above and the code in sync
//
// 2. What is `n if n >= ...`?
//    - A match guard: bind the value to `n`, then only match if the condition holds
//
// 3. Why `self` (by value) in price_slots?
//    - FactsLayout is Copy, so taking it by value costs nothing
// -----------------------------------------------------------------------------

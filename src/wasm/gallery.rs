use web_sys::{Document, Element};

use crate::error::{describe, PetalError, Result};

pub const GRID_ID: &str = "servicios-grid";

/// Append one clone of every card in the gallery grid so the CSS marquee
/// can scroll half the track and loop without a visible seam.
pub fn duplicate_cards(grid: &Element) -> Result<u32> {
    // `children()` is live; only walk the cards that were there to begin with.
    let cards = grid.children();
    let count = cards.length();
    for i in 0..count {
        let Some(card) = cards.item(i) else {
            continue;
        };
        let clone = card
            .clone_node_with_deep(true)
            .map_err(|e| PetalError::Dom(describe(&e)))?;
        grid.append_child(&clone)
            .map_err(|e| PetalError::Dom(describe(&e)))?;
    }
    Ok(count)
}

pub fn init(document: &Document) -> Result<()> {
    let grid = document
        .get_element_by_id(GRID_ID)
        .ok_or_else(|| PetalError::MissingElement(format!("#{GRID_ID}")))?;
    let cards = duplicate_cards(&grid)?;
    log::debug!("gallery marquee doubled {cards} cards");
    Ok(())
}

//! `--dump` mode: fetch, parse and lay out a document without opening a
//! window, printing the tree outline and the display list to stdout.
//! Measurement uses system fonts when available and deterministic derived
//! metrics otherwise.

use gfx::FontBook;
use layout::{FontSlant, FontWeight, Viewport};
use net::FetchError;

pub fn dump(target: &str) -> Result<(), FetchError> {
    let response = net::fetch(target)?;
    let dom = html::parse(&response.body);

    for line in html::outline(&dom) {
        println!("{line}");
    }

    let book = FontBook::from_system_fonts();
    let items = layout::layout(&dom, &book, Viewport::default());

    println!();
    for item in &items {
        let weight = match item.style.weight {
            FontWeight::Bold => 'b',
            FontWeight::Normal => '-',
        };
        let slant = match item.style.slant {
            FontSlant::Italic => 'i',
            FontSlant::Roman => '-',
        };
        println!(
            "{:>8.1} {:>8.1}  {}{}{:<3} {}",
            item.x, item.y, weight, slant, item.style.size, item.text
        );
    }
    Ok(())
}

//! Artist listing page parsing.
//!
//! The listing is a table: each module row carries an
//! `<a title="Download" href="...#file.xm">` link and the song title in a
//! `<td width="300">` cell. The next page is linked with
//! `<a class="pagination" href="...">&gt;</a>`.

use crate::error::{CatalogError, Result};
use crate::types::CatalogEntry;
use lol_html::{element, rewrite_str, text, RewriteStrSettings};
use std::{cell::RefCell, rc::Rc};
use tracing::debug;
use url::Url;

/// Entries and next-page link found on one listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    pub entries: Vec<(String, CatalogEntry)>,
    pub next: Option<Url>,
}

#[derive(Debug, Clone, Default)]
struct RowScan {
    href: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct PageScan {
    rows: Vec<RowScan>,
    /// `(href, raw text)` of every pagination anchor
    pagination: Vec<(Option<String>, String)>,
}

impl PageScan {
    fn current_row(&mut self) -> &mut RowScan {
        if self.rows.is_empty() {
            self.rows.push(RowScan::default());
        }
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }
}

/// Decoded text with runs of whitespace (including `&nbsp;`) collapsed.
fn visible_text(raw: &str) -> String {
    html_escape::decode_html_entities(raw)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decoded_attr(raw: &str) -> String {
    html_escape::decode_html_entities(raw).trim().to_string()
}

/// File identifier of a download link: the part after the last `#`.
fn identifier_from_href(href: &str) -> Option<String> {
    let id = href.rsplit('#').next()?.trim();
    if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
        return None;
    }
    Some(id.to_string())
}

fn scan_page(html: &str) -> Result<PageScan> {
    let state = Rc::new(RefCell::new(PageScan::default()));

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("tr", {
                    let state = Rc::clone(&state);
                    move |_| {
                        state.borrow_mut().rows.push(RowScan::default());
                        Ok(())
                    }
                }),
                element!(r#"a[title="Download"]"#, {
                    let state = Rc::clone(&state);
                    move |el| {
                        let mut state = state.borrow_mut();
                        let row = state.current_row();
                        if row.href.is_none() {
                            row.href = el.get_attribute("href");
                        }
                        Ok(())
                    }
                }),
                element!(r#"td[width="300"]"#, {
                    let state = Rc::clone(&state);
                    move |_| {
                        state
                            .borrow_mut()
                            .current_row()
                            .title
                            .get_or_insert_with(String::new);
                        Ok(())
                    }
                }),
                text!(r#"td[width="300"]"#, {
                    let state = Rc::clone(&state);
                    move |t| {
                        let mut state = state.borrow_mut();
                        state
                            .current_row()
                            .title
                            .get_or_insert_with(String::new)
                            .push_str(t.as_str());
                        Ok(())
                    }
                }),
                element!("a.pagination", {
                    let state = Rc::clone(&state);
                    move |el| {
                        state
                            .borrow_mut()
                            .pagination
                            .push((el.get_attribute("href"), String::new()));
                        Ok(())
                    }
                }),
                text!("a.pagination", {
                    let state = Rc::clone(&state);
                    move |t| {
                        if let Some((_, text)) = state.borrow_mut().pagination.last_mut() {
                            text.push_str(t.as_str());
                        }
                        Ok(())
                    }
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| CatalogError::Parse(err.to_string()))?;

    let scan = Rc::try_unwrap(state)
        .map(RefCell::into_inner)
        .unwrap_or_else(|rc| rc.borrow().clone());

    Ok(scan)
}

/// Parse one listing page.
///
/// Relative links are resolved against `page_url`.
pub fn parse_page(html: &str, page_url: &Url) -> Result<ParsedPage> {
    let scan = scan_page(html)?;
    let mut page = ParsedPage::default();

    for row in scan.rows {
        let Some(raw_href) = row.href else {
            continue;
        };
        let href = decoded_attr(&raw_href);

        let Some(identifier) = identifier_from_href(&href) else {
            debug!(href = %href, "Skipping download link without a usable file name");
            continue;
        };

        let url = page_url.join(&href)?;
        let title = row
            .title
            .map(|raw| visible_text(&raw))
            .filter(|t| !t.is_empty());

        page.entries.push((identifier, CatalogEntry { url, title }));
    }

    page.next = scan
        .pagination
        .into_iter()
        .filter(|(_, text)| visible_text(text) == ">")
        .find_map(|(href, _)| href)
        .map(|href| page_url.join(&decoded_attr(&href)))
        .transpose()?;

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
<table>
  <tr><th>Title</th><th>Size</th></tr>
  <tr>
    <td width="300"><a href="module.php?1">Space&nbsp;Debris</a></td>
    <td><a href="https://api.example.org/downloads.php?moduleid=1#space_debris.mod" title="Download">dl</a></td>
  </tr>
  <tr>
    <td width="300"> Beyond  the &amp; Network </td>
    <td><a title='Download' href='/downloads.php?moduleid=2#beyond.it'>dl</a></td>
  </tr>
  <tr>
    <td width="300">No link here</td>
  </tr>
</table>
<a class="pagination" href="?page=1">&lt;</a>
<a class="pagination" href="index.php?request=view_artist_modules&amp;query=7&amp;page=2">&gt;</a>
</body></html>
"#;

    fn base() -> Url {
        Url::parse("https://example.org/index.php?request=view_artist_modules&query=7").unwrap()
    }

    #[test]
    fn extracts_download_rows() {
        let page = parse_page(PAGE, &base()).unwrap();
        assert_eq!(page.entries.len(), 2);

        let (id, entry) = &page.entries[0];
        assert_eq!(id, "space_debris.mod");
        assert_eq!(entry.title.as_deref(), Some("Space Debris"));
        assert_eq!(entry.url.host_str(), Some("api.example.org"));

        let (id, entry) = &page.entries[1];
        assert_eq!(id, "beyond.it");
        assert_eq!(entry.title.as_deref(), Some("Beyond the & Network"));
        assert_eq!(
            entry.url.as_str(),
            "https://example.org/downloads.php?moduleid=2#beyond.it"
        );
    }

    #[test]
    fn finds_next_page_link() {
        let page = parse_page(PAGE, &base()).unwrap();
        assert_eq!(
            page.next.unwrap().as_str(),
            "https://example.org/index.php?request=view_artist_modules&query=7&page=2"
        );
    }

    #[test]
    fn last_page_has_no_next() {
        let html = r#"<a class="pagination" href="?page=1">&lt;</a>"#;
        let page = parse_page(html, &base()).unwrap();
        assert!(page.next.is_none());
        assert!(page.entries.is_empty());
    }

    #[test]
    fn row_without_title_cell_has_no_listing_title() {
        let html = r#"<table><tr><td><a title="Download" href="/d.php?id=3#bare.s3m">dl</a></td></tr></table>"#;
        let page = parse_page(html, &base()).unwrap();
        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.entries[0].0, "bare.s3m");
        assert!(page.entries[0].1.title.is_none());
    }

    #[test]
    fn title_cell_entities_are_decoded() {
        let html = r#"<table><tr>
            <td width="300">Caf&#233; &#x41;&nbsp;Go</td>
            <td><a title="Download" href="/d.php?id=4#cafe.mod">dl</a></td>
        </tr></table>"#;
        let page = parse_page(html, &base()).unwrap();
        assert_eq!(page.entries[0].1.title.as_deref(), Some("Café A Go"));
    }

    #[test]
    fn rejects_path_like_identifiers() {
        assert_eq!(identifier_from_href("x#a.mod").as_deref(), Some("a.mod"));
        assert_eq!(identifier_from_href("no-fragment.xm").as_deref(), Some("no-fragment.xm"));
        assert!(identifier_from_href("x#../etc/passwd").is_none());
        assert!(identifier_from_href("x#").is_none());
        assert!(identifier_from_href("x#..").is_none());
    }
}

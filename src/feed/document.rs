use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use thiserror::Error;

/// SEC-003: Maximum element nesting depth accepted in a feed document.
const MAX_DOCUMENT_DEPTH: usize = 64;

/// Errors that stop parsing of a feed document.
///
/// Parsing is lenient: whatever was read before the error is still returned
/// in [`ParseOutcome::document`].
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The body contained no root element at all.
    #[error("Feed document is empty")]
    Empty,

    /// Root element is not `<rss>`.
    #[error("Expected <rss> root element, found <{0}>")]
    UnexpectedRoot(String),

    /// SEC-003: Nesting depth exceeds safety limit.
    #[error("Feed nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    /// XML parsing failed.
    #[error("XML parse error: {0}")]
    Xml(String),
}

/// Channel-level metadata shared by every item of a feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Channel {
    pub title: String,
    pub link: String,
}

/// An item exactly as found in the document, date still unparsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: String,
}

/// Parsed representation of one fetched RSS document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedDocument {
    pub channel: Channel,
    pub items: Vec<RawItem>,
}

/// Result of [`parse_document`]: the (possibly partial) document plus the
/// error that cut parsing short, if any.
#[derive(Debug)]
pub struct ParseOutcome {
    pub document: FeedDocument,
    pub error: Option<DocumentError>,
}

/// Parses an RSS 2.0 body into a [`FeedDocument`].
///
/// Element names are matched on their local part, so `atom:link` counts as a
/// channel link. The channel link is the last `href` attribute found on a
/// channel-level link element, falling back to the text of `<link>`.
///
/// Parsing never fails outright. On malformed XML the fields and completed
/// items read so far are kept and the error is reported alongside them; an
/// item still open at the point of failure is discarded.
pub fn parse_document(bytes: &[u8]) -> ParseOutcome {
    let mut parser = DocumentParser::default();
    let error = parser.run(bytes).err();
    ParseOutcome {
        document: parser.finish(),
        error,
    }
}

/// What the innermost open element feeds text into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    ChannelTitle,
    ChannelLink,
    Item,
    ItemTitle,
    ItemLink,
    ItemDescription,
    ItemPubDate,
    Other,
}

#[derive(Default)]
struct DocumentParser {
    path: Vec<Vec<u8>>,
    slots: Vec<Slot>,
    seen_root: bool,
    channel_title: String,
    link_text: String,
    link_href: Option<String>,
    current: Option<RawItem>,
    items: Vec<RawItem>,
}

impl DocumentParser {
    fn run(&mut self, bytes: &[u8]) -> Result<(), DocumentError> {
        // SEC-002: quick-xml never expands custom <!ENTITY> declarations
        // Text is kept whole; only a field's final value is trimmed
        let mut reader = Reader::from_reader(bytes);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => self.open(&e, &reader, false)?,
                Ok(Event::Empty(e)) => {
                    self.open(&e, &reader, true)?;
                    self.close();
                }
                Ok(Event::End(_)) => self.close(),
                Ok(Event::Text(e)) => {
                    // Unknown entities such as &nbsp; keep their raw spelling
                    let text = e
                        .unescape()
                        .map(Cow::into_owned)
                        .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                    self.push_text(&text);
                }
                Ok(Event::CData(e)) => self.push_text(&String::from_utf8_lossy(&e)),
                Ok(Event::Eof) => break,
                Err(e) => return Err(DocumentError::Xml(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        if !self.seen_root {
            return Err(DocumentError::Empty);
        }
        Ok(())
    }

    fn open(
        &mut self,
        e: &BytesStart<'_>,
        reader: &Reader<&[u8]>,
        empty: bool,
    ) -> Result<(), DocumentError> {
        let name = e.local_name().as_ref().to_vec();

        if !self.seen_root {
            if name != b"rss" {
                return Err(DocumentError::UnexpectedRoot(
                    String::from_utf8_lossy(&name).into_owned(),
                ));
            }
            self.seen_root = true;
        }

        if self.path.len() >= MAX_DOCUMENT_DEPTH {
            return Err(DocumentError::MaxDepthExceeded(MAX_DOCUMENT_DEPTH));
        }
        self.path.push(name);

        let slot = self.locate();
        match slot {
            Slot::ChannelTitle => self.channel_title.clear(),
            Slot::ChannelLink => {
                if let Some(href) = href_attribute(e, reader) {
                    self.link_href = Some(href);
                }
                if !empty {
                    self.link_text.clear();
                }
            }
            Slot::Item => self.current = Some(RawItem::default()),
            Slot::ItemTitle | Slot::ItemLink | Slot::ItemDescription | Slot::ItemPubDate => {
                if let Some(field) = self.item_field(slot) {
                    field.clear();
                }
            }
            Slot::Other => {}
        }
        self.slots.push(slot);

        Ok(())
    }

    fn close(&mut self) {
        self.path.pop();
        match self.slots.pop() {
            Some(Slot::Item) => {
                if let Some(item) = self.current.take() {
                    self.items.push(item);
                }
            }
            Some(slot) => {
                if let Some(field) = self.item_field(slot) {
                    trim_in_place(field);
                }
            }
            None => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        let target = match self.slots.last().copied() {
            Some(Slot::ChannelTitle) => Some(&mut self.channel_title),
            Some(Slot::ChannelLink) => Some(&mut self.link_text),
            Some(slot) => self.item_field(slot),
            None => None,
        };
        if let Some(target) = target {
            target.push_str(text);
        }
    }

    fn item_field(&mut self, slot: Slot) -> Option<&mut String> {
        let item = self.current.as_mut()?;
        match slot {
            Slot::ItemTitle => Some(&mut item.title),
            Slot::ItemLink => Some(&mut item.link),
            Slot::ItemDescription => Some(&mut item.description),
            Slot::ItemPubDate => Some(&mut item.pub_date),
            _ => None,
        }
    }

    /// Classifies the element on top of `path`.
    fn locate(&self) -> Slot {
        let path: Vec<&[u8]> = self.path.iter().map(Vec::as_slice).collect();
        match path.as_slice() {
            [b"rss", b"channel", b"title"] => Slot::ChannelTitle,
            [b"rss", b"channel", b"link"] => Slot::ChannelLink,
            [b"rss", b"channel", b"item"] => Slot::Item,
            [b"rss", b"channel", b"item", b"title"] => Slot::ItemTitle,
            [b"rss", b"channel", b"item", b"link"] => Slot::ItemLink,
            [b"rss", b"channel", b"item", b"description"] => Slot::ItemDescription,
            [b"rss", b"channel", b"item", b"pubDate"] => Slot::ItemPubDate,
            _ => Slot::Other,
        }
    }

    fn finish(mut self) -> FeedDocument {
        trim_in_place(&mut self.channel_title);
        trim_in_place(&mut self.link_text);
        FeedDocument {
            channel: Channel {
                title: self.channel_title,
                link: self.link_href.unwrap_or(self.link_text),
            },
            items: self.items,
        }
    }
}

fn trim_in_place(text: &mut String) {
    let trimmed = text.trim();
    if trimmed.len() != text.len() {
        *text = trimmed.to_string();
    }
}

fn href_attribute(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Option<String> {
    e.attributes().find_map(|attr_result| {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed link attribute");
                return None;
            }
        };
        if attr.key.local_name().as_ref() != b"href" {
            return None;
        }
        attr.decode_and_unescape_value(reader.decoder())
            .ok()
            .map(|value| value.into_owned())
    })
}

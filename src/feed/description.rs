use pulldown_cmark::{html, Options, Parser};
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use std::borrow::Cow;

use crate::util::{strip_unterminated_tag, truncate_to_bytes};

/// Byte ceiling for the wrapped channel description.
pub const CHANNEL_DESCRIPTION_LIMIT: usize = 4000;

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";
/// A terminator inside content, split across two sections.
const CDATA_CLOSE_SPLIT: &str = "]]]]><![CDATA[>";

/// Renders markdown to an HTML fragment wrapped as `<![CDATA[...]]>`.
///
/// Entities produced by the renderer are decoded first since the wrapped
/// block must carry literal characters. The result is emitted raw by the
/// feed writer, which escapes only `&`.
///
/// # Examples
///
/// ```
/// use podcast_rss_generator::feed::format_description;
///
/// assert_eq!(
///     format_description("Tom & **Jerry**"),
///     "<![CDATA[<p>Tom & <strong>Jerry</strong></p>]]>"
/// );
/// ```
pub fn format_description(markdown: &str) -> String {
    wrap(&render_html(markdown))
}

/// Like [`format_description`] but never longer than
/// [`CHANNEL_DESCRIPTION_LIMIT`] bytes.
///
/// Oversized content is cut to fit inside the wrapper; a tag left open by
/// the cut is dropped entirely, so the result may come in under the limit.
pub fn format_channel_description(markdown: &str) -> String {
    format_limited(markdown, CHANNEL_DESCRIPTION_LIMIT)
}

fn format_limited(markdown: &str, limit: usize) -> String {
    let html = render_html(markdown);
    let full = wrap(&html);
    if full.len() <= limit {
        return full;
    }

    let budget = limit.saturating_sub(CDATA_OPEN.len() + CDATA_CLOSE.len());
    let mut content = strip_unterminated_tag(truncate_to_bytes(&html, budget));
    let mut wrapped = wrap(content);
    // Split terminators grow the wrapped form
    while wrapped.len() > limit && !content.is_empty() {
        content = strip_unterminated_tag(truncate_to_bytes(content, content.len() - 1));
        wrapped = wrap(content);
    }
    tracing::debug!(
        original_bytes = full.len(),
        limit = limit,
        kept_bytes = content.len(),
        "Truncated description to byte limit"
    );
    wrapped
}

fn render_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::empty());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);

    decode_entities(out.trim_end()).into_owned()
}

/// Decodes character references one at a time. A `&` that does not start a
/// known reference, such as one in a raw link's query string, is kept.
fn decode_entities(html: &str) -> Cow<'_, str> {
    if !html.contains('&') {
        return Cow::Borrowed(html);
    }

    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = reference_len(tail).and_then(|len| {
            unescape_with(&tail[..len], resolve_html5_entity)
                .ok()
                .map(|text| (len, text))
        });
        match decoded {
            Some((len, text)) => {
                out.push_str(&text);
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Byte length of a `&name;` or `&#nn;` reference at the start of `s`.
fn reference_len(s: &str) -> Option<usize> {
    let body = s.strip_prefix('&')?;
    let end = body.find(|c: char| !(c.is_ascii_alphanumeric() || c == '#'))?;
    (end > 0 && body[end..].starts_with(';')).then_some(end + 2)
}

fn wrap(content: &str) -> String {
    let content = content.replace(CDATA_CLOSE, CDATA_CLOSE_SPLIT);
    let mut wrapped = String::with_capacity(CDATA_OPEN.len() + content.len() + CDATA_CLOSE.len());
    wrapped.push_str(CDATA_OPEN);
    wrapped.push_str(&content);
    wrapped.push_str(CDATA_CLOSE);
    wrapped
}

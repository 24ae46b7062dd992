//! Message assembly and chunking for the messaging gateway.

/// Per-message character budget. Discord caps messages at 2000 chars;
/// staying under leaves headroom for gateway-side additions.
pub const CHUNK_BUDGET: usize = 1900;

/// Emitted instead of sending nothing when a digest or manual fetch comes
/// back empty.
pub const NO_NEWS_SENTINEL: &str = "📭 No fresh headlines right now.";

pub const SWEEP_HEADER: &str = "📰 **Stock News Sweep**";
pub const DIGEST_HEADER: &str = "🗞️ **Daily News Digest**";

/// Join per-symbol blocks with a blank line, substituting the no-news
/// sentinel when everything is empty.
pub fn assemble(blocks: &[String]) -> String {
    let joined = blocks
        .iter()
        .filter(|b| !b.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join("\n\n");

    if joined.is_empty() {
        NO_NEWS_SENTINEL.to_string()
    } else {
        joined
    }
}

/// Split `text` into chunks of at most `budget` characters, in order.
///
/// Splits on character boundaries only, so a multi-line news block may
/// be cut mid-block. Accepted limitation: order and content are
/// preserved exactly, and readers tolerate a rare mid-block split.
pub fn chunk(text: &str, budget: usize) -> Vec<String> {
    let budget = budget.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0usize;

    for ch in text.chars() {
        if count == budget {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Accumulates raw SSE bytes and yields complete `\n\n`-terminated blocks.
#[derive(Debug, Default)]
pub struct SseBuffer {
    buffer: String,
}

/// One `data:` payload from an upstream event stream.
#[derive(Debug, PartialEq, Eq)]
pub enum SseData<'a> {
    Payload(&'a str),
    Done,
}

impl SseBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    pub fn push_chunk(&mut self, chunk: &[u8]) {
        let text = String::from_utf8_lossy(chunk);
        // Some upstreams frame events with CRLF.
        self.buffer.push_str(&text.replace("\r\n", "\n"));
    }

    pub fn next_event_block(&mut self) -> Option<String> {
        let boundary = self.buffer.find("\n\n")?;
        let remaining = self.buffer.split_off(boundary + 2);
        Some(std::mem::replace(&mut self.buffer, remaining))
    }

    /// Whatever is left once the upstream closed without a final blank line.
    pub fn take_remainder(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        (!rest.trim().is_empty()).then_some(rest)
    }
}

pub fn parse_data_lines(event_block: &str) -> Vec<SseData<'_>> {
    event_block
        .lines()
        .filter_map(|line| {
            line.strip_prefix("data:")
                .map(str::trim_start)
        })
        .filter(|data| !data.is_empty())
        .map(|data| {
            if data == "[DONE]" {
                SseData::Done
            } else {
                SseData::Payload(data)
            }
        })
        .collect()
}

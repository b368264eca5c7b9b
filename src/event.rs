#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Init,
    Line(String),
    Eof,
}

impl Event {
    pub fn is_quit(&self) -> bool {
        match self {
            Event::Eof => true,
            Event::Line(line) => matches!(line.trim(), "q" | "quit"),
            Event::Init => false,
        }
    }
}

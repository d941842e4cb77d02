use super::zones::Zone;
use crate::doc::TextOptions;

/// An emphasis marker consumed by a match, as a flat range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub style: TextOptions,
    pub start: usize,
    pub end: usize,
}

/// A `*`, `_` or `~` run taking part in emphasis resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub ch: char,
    pub start: usize,
    pub len: usize,
    /// Characters consumed from the left by matches where the run closed.
    pub left: usize,
    /// Characters consumed from the right by matches where the run opened.
    pub right: usize,
    pub can_open: bool,
    pub can_close: bool,
    pub open_markers: Vec<Marker>,
    pub close_markers: Vec<Marker>,
}

impl Run {
    pub fn remaining(&self) -> usize {
        self.len - self.left - self.right
    }

    /// Literal characters left after matching.
    pub fn leftover(&self) -> (usize, usize) {
        (self.start + self.left, self.start + self.len - self.right)
    }

    pub fn is_matched(&self) -> bool {
        self.left > 0 || self.right > 0
    }
}

/// A resolved `[text](url)` or `![alt](url)` with its parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkItem {
    pub image: bool,
    pub url: String,
    pub title: String,
    pub children: Vec<Item>,
    pub start: usize,
    pub end: usize,
    /// Between the brackets.
    pub text: (usize, usize),
    pub url_range: Option<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Text { start: usize, end: usize },
    Run(Run),
    /// `[` or `![` that never closed.
    Bracket { start: usize, len: usize },
    Zone(Zone),
    /// End of the paragraph line with the given index.
    LineEnd(usize),
    Link(Box<LinkItem>),
    FootnoteRef { start: usize, end: usize, key: String },
}

/// A piece with the emphasis styles applied to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub piece: Piece,
    pub style: TextOptions,
}

impl Item {
    pub fn new(piece: Piece) -> Self {
        Self {
            piece,
            style: TextOptions::empty(),
        }
    }

    pub fn run_mut(&mut self) -> Option<&mut Run> {
        match &mut self.piece {
            Piece::Run(r) => Some(r),
            _ => None,
        }
    }

    pub fn run(&self) -> Option<&Run> {
        match &self.piece {
            Piece::Run(r) => Some(r),
            _ => None,
        }
    }
}

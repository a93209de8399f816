use crate::domain::curve::rational::Rational;

/// One linear stretch of a curve, covering `[start, next piece's start)`.
///
/// The value at `start` is stored separately from the limit just after it, which keeps
/// left-continuous steps (stair curves) and the `f(0) = 0, f(0+) = burst` shape of
/// sigma-rho curves exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub start: Rational,

    /// `f(start)`.
    pub value: Rational,

    /// `lim f(t)` for `t -> start+`.
    pub right: Rational,

    /// Slope of the open part of the piece.
    pub slope: Rational,
}

impl Piece {
    pub fn new(start: Rational, value: Rational, right: Rational, slope: Rational) -> Self {
        Self { start, value, right, slope }
    }

    /// A piece that is continuous at its start.
    pub fn continuous(start: Rational, value: Rational, slope: Rational) -> Self {
        Self { start, right: value.clone(), value, slope }
    }

    /// Value of the open part extended to `t`.
    pub fn line_at(&self, t: &Rational) -> Rational {
        &self.right + &self.slope * (t - &self.start)
    }

    /// The same piece translated by `dt` in time and `dv` in value.
    pub fn shifted(&self, dt: &Rational, dv: &Rational) -> Self {
        Self { start: &self.start + dt, value: &self.value + dv, right: &self.right + dv, slope: self.slope.clone() }
    }

    /// Splits the piece at `t` (strictly inside the piece), returning the tail part.
    pub fn tail_from(&self, t: &Rational) -> Self {
        Piece::continuous(t.clone(), self.line_at(t), self.slope.clone())
    }
}

/// Elementary building block of min-plus operations: an isolated point or an open segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Point { time: Rational, value: Rational },
    Open { start: Rational, end: Rational, right: Rational, slope: Rational },
}

impl Element {
    pub fn start(&self) -> &Rational {
        match self {
            Element::Point { time, .. } => time,
            Element::Open { start, .. } => start,
        }
    }
}

/// Splits a list of pieces covering `[0, horizon)` into points and open segments.
pub fn elements(pieces: &[Piece], horizon: &Rational) -> Vec<Element> {
    let mut out = Vec::with_capacity(pieces.len() * 2);

    for (index, piece) in pieces.iter().enumerate() {
        let end = pieces.get(index + 1).map(|next| &next.start).unwrap_or(horizon);

        out.push(Element::Point { time: piece.start.clone(), value: piece.value.clone() });
        if *end > piece.start {
            out.push(Element::Open { start: piece.start.clone(), end: end.clone(), right: piece.right.clone(), slope: piece.slope.clone() });
        }
    }

    out
}

/// Re-cuts `pieces` so that a piece starts at every time in `starts`.
///
/// `starts` must be sorted, begin at zero and lie inside the covered range.
pub fn refine(pieces: &[Piece], starts: &[Rational]) -> Vec<Piece> {
    let mut out = Vec::with_capacity(starts.len());
    let mut current = 0;

    for start in starts {
        while current + 1 < pieces.len() && pieces[current + 1].start <= *start {
            current += 1;
        }

        let piece = &pieces[current];
        if piece.start == *start { out.push(piece.clone()) } else { out.push(piece.tail_from(start)) }
    }

    out
}

/// Sorted union of the start times of two piece lists.
pub fn merged_starts(a: &[Piece], b: &[Piece]) -> Vec<Rational> {
    let mut starts: Vec<Rational> = a.iter().chain(b.iter()).map(|piece| piece.start.clone()).collect();
    starts.sort();
    starts.dedup();
    starts
}

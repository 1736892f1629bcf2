pub(crate) mod arena;
pub(crate) mod sketch;
pub(crate) mod slru;
pub(crate) mod window;

/// Which queue a cache entry currently belongs to.
///
/// Entries start in the admission window, win a place in probation when the
/// window overflows in their favor, and reach the protected segment on a
/// probation hit.  A protected overflow demotes back to probation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Segment {
    Window,
    Probation,
    Protected,
}

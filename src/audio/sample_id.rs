// Audio-thread identity of a loaded sound. The control side maps its string
// sound ids onto these so the render callback never hashes strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SampleId(pub u32);

// Hands out ids for one playback engine. Owned, not global, so two engines
// (e.g. in tests) never share a counter.
#[derive(Debug, Default)]
pub struct SampleIds {
    next: u32,
}

impl SampleIds {
    pub fn next_id(&mut self) -> SampleId {
        let id = SampleId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

// Request registry - at most one in-flight request per region
use crate::domain::region::RegionId;
use crate::domain::request::{PendingRequest, RequestId};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct RequestRegistry {
    pending: HashMap<RegionId, PendingRequest>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, region: &RegionId) -> Option<&PendingRequest> {
        self.pending.get(region)
    }

    pub fn contains(&self, region: &RegionId) -> bool {
        self.pending.contains_key(region)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Register `request` under its region, returning whatever it replaced.
    /// Untracked requests (no region) are not stored.
    pub fn register(&mut self, request: PendingRequest) -> Option<PendingRequest> {
        let region = request.region.clone()?;
        self.pending.insert(region, request)
    }

    /// Drop the entry for `region` if it still belongs to request `id`.
    /// A superseded request completing late must not evict its successor.
    pub fn release(&mut self, region: &RegionId, id: RequestId) -> bool {
        match self.pending.get(region) {
            Some(current) if current.id == id => {
                self.pending.remove(region);
                true
            }
            _ => false,
        }
    }

    /// Abort the request pending for `region`, if any. The entry stays until
    /// the aborted request reports back.
    pub fn abort(&self, region: &RegionId) -> bool {
        match self.pending.get(region) {
            Some(request) => {
                request.abort();
                true
            }
            None => false,
        }
    }

    /// Abort everything and forget it.
    pub fn abort_all(&mut self) -> usize {
        let count = self.pending.len();
        for (_, request) in self.pending.drain() {
            request.abort();
        }
        count
    }
}

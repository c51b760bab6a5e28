// font-atlas/src/publish.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Hands finished atlases from bake workers to renderers.
//!
//! Every bake starts by taking a ticket. A finished atlas is only published if its ticket is
//! still the newest one; results of superseded bakes are dropped. Readers always see either the
//! previous atlas or the new one, swapped in whole.

use arc_swap::ArcSwapOption;
use log::{debug, info, warn};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::atlas::{AtlasConfig, FontAtlas};
use crate::error::AtlasError;
use crate::handle::FontHandle;

/// Identifies one bake request. Later tickets supersede earlier ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BakeTicket(u64);

impl BakeTicket {
    /// The request's position in the order requests were made, starting at 1.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct Published {
    generation: u64,
    atlas: Arc<FontAtlas>,
}

/// The current atlas, shared between bake workers and readers.
#[derive(Debug, Default)]
pub struct AtlasPublisher {
    latest_request: AtomicU64,
    current: ArcSwapOption<Published>,
}

impl AtlasPublisher {
    /// Creates a publisher with no atlas.
    pub fn new() -> AtlasPublisher {
        AtlasPublisher::default()
    }

    /// Starts a new bake request, superseding every earlier one.
    pub fn request(&self) -> BakeTicket {
        BakeTicket(self.latest_request.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Returns true if no newer request has been made since `ticket`.
    #[inline]
    pub fn is_current(&self, ticket: BakeTicket) -> bool {
        self.latest_request.load(Ordering::Acquire) == ticket.0
    }

    /// Publishes the atlas baked for `ticket`, unless a newer request has been made in the
    /// meantime. Returns whether the atlas was published.
    pub fn publish(&self, ticket: BakeTicket, atlas: FontAtlas) -> bool {
        if !self.is_current(ticket) {
            warn!(
                "discarding stale atlas for {} (request {} superseded)",
                atlas.font_family(),
                ticket.0
            );
            return false;
        }

        let atlas = Arc::new(atlas);
        let mut accepted = false;
        self.current.rcu(|current| match current {
            Some(published) if published.generation > ticket.0 => {
                accepted = false;
                Some(published.clone())
            }
            _ => {
                accepted = true;
                Some(Arc::new(Published {
                    generation: ticket.0,
                    atlas: atlas.clone(),
                }))
            }
        });

        if accepted {
            info!("published atlas for {} (request {})", atlas.font_family(), ticket.0);
        } else {
            warn!("discarding atlas for request {}: a newer one is published", ticket.0);
        }
        accepted
    }

    /// The most recently published atlas, if any.
    pub fn current(&self) -> Option<Arc<FontAtlas>> {
        self.current
            .load_full()
            .map(|published| published.atlas.clone())
    }

    /// The ticket generation of the most recently published atlas, or 0 if there is none.
    pub fn current_generation(&self) -> u64 {
        self.current
            .load_full()
            .map_or(0, |published| published.generation)
    }

    /// Bakes `font` on a background thread and publishes the result when it finishes.
    ///
    /// The join handle yields whether the atlas was published, or the bake error.
    pub fn spawn_bake<F>(
        self: &Arc<Self>,
        font: F,
        nominal_point_size: f32,
        config: AtlasConfig,
    ) -> io::Result<(BakeTicket, JoinHandle<Result<bool, AtlasError>>)>
    where
        F: FontHandle + Send + 'static,
    {
        let ticket = self.request();
        let publisher = Arc::clone(self);
        let handle = thread::Builder::new()
            .name(format!("font-atlas-bake-{}", ticket.0))
            .spawn(move || {
                debug!("bake worker for request {} started", ticket.0);
                let atlas = FontAtlas::bake(&font, nominal_point_size, &config)?;
                Ok(publisher.publish(ticket, atlas))
            })?;
        Ok((ticket, handle))
    }
}

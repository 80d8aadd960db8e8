//! Asynchronous Image Loading
//!
//! [`ImageLoader`] starts one worker thread per source and collects the
//! results over a `flume` channel as they finish, in completion order rather
//! than request order. A [`ReadyLatch`] counts the outstanding loads and opens
//! exactly once, after the last one completes.
//!
//! A load that never completes would hold the latch shut forever, so waiting
//! is always bounded by a deadline. Loads still pending at the deadline are
//! reported as [`AssetError::Timeout`] and then handled by the
//! [`LoadPolicy`] like any other failure.

use std::time::{Duration, Instant};

use plunge_core::{AssetError, Error, Image, Result};
use serde::{Deserialize, Serialize};

use crate::latch::ReadyLatch;
use crate::source::ImageSource;

pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// What to do when a source fails to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Abort the whole session with the first failure.
    #[default]
    Fail,
    /// Drop failed sources and continue with the rest.
    Skip,
}

struct Completion {
    index: usize,
    result: std::result::Result<Image, AssetError>,
}

/// Tracks a batch of in-flight image loads.
pub struct ImageLoader {
    names: Vec<String>,
    slots: Vec<Option<std::result::Result<Image, AssetError>>>,
    completion_order: Vec<usize>,
    receiver: flume::Receiver<Completion>,
    latch: ReadyLatch,
}

impl ImageLoader {
    /// Starts loading every source. Already-decoded sources complete
    /// immediately; the rest load on worker threads.
    #[must_use]
    pub fn spawn(sources: &[ImageSource]) -> Self {
        let (sender, receiver) = flume::unbounded();
        let names: Vec<String> = sources.iter().map(|s| s.name().into_owned()).collect();

        for (index, source) in sources.iter().enumerate() {
            if let ImageSource::Decoded(image) = source {
                let _ = sender.send(Completion {
                    index,
                    result: Ok(image.clone()),
                });
                continue;
            }

            let worker_sender = sender.clone();
            let worker_source = source.clone();
            let spawned = std::thread::Builder::new()
                .name(format!("plunge-load-{index}"))
                .spawn(move || {
                    let result = worker_source.load();
                    let _ = worker_sender.send(Completion { index, result });
                });

            if let Err(error) = spawned {
                let _ = sender.send(Completion {
                    index,
                    result: Err(AssetError::Io {
                        source_name: names[index].clone(),
                        error,
                    }),
                });
            }
        }

        let mut latch = ReadyLatch::new(sources.len());
        latch.open_if_empty();

        Self {
            slots: (0..sources.len()).map(|_| None).collect(),
            names,
            completion_order: Vec::with_capacity(sources.len()),
            receiver,
            latch,
        }
    }

    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    #[must_use]
    pub fn pending(&self) -> usize {
        self.latch.remaining()
    }

    /// `true` once every load has completed (successfully or not).
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.latch.is_open()
    }

    /// Source indices in the order their loads completed.
    #[must_use]
    pub fn completion_order(&self) -> &[usize] {
        &self.completion_order
    }

    /// Drains completions without blocking. Returns `true` if this call
    /// opened the latch.
    pub fn poll(&mut self) -> bool {
        let mut opened = false;
        while let Ok(completion) = self.receiver.try_recv() {
            opened |= self.record(completion);
        }
        opened
    }

    /// Blocks until every load completes or `timeout` elapses. Loads still
    /// pending at the deadline are marked as timed out, so the latch is
    /// always open when this returns.
    pub fn wait(&mut self, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        while !self.latch.is_open() {
            match self.receiver.recv_deadline(deadline) {
                Ok(completion) => {
                    self.record(completion);
                }
                Err(flume::RecvTimeoutError::Timeout) => {
                    self.abandon_pending(|name| AssetError::Timeout {
                        source_name: name,
                        timeout,
                    });
                }
                Err(flume::RecvTimeoutError::Disconnected) => {
                    self.abandon_pending(AssetError::WorkerLost);
                }
            }
        }
    }

    /// Applies `policy` to the collected results and returns the loaded
    /// images in source order.
    pub fn finish(self, policy: LoadPolicy) -> Result<Vec<Image>> {
        let mut images = Vec::with_capacity(self.slots.len());
        let mut first_error = None;

        for (slot, name) in self.slots.into_iter().zip(&self.names) {
            match slot {
                Some(Ok(image)) => images.push(image),
                Some(Err(err)) => {
                    match policy {
                        LoadPolicy::Fail => log::error!("Failed to load image '{name}': {err}"),
                        LoadPolicy::Skip => log::warn!("Skipping image '{name}': {err}"),
                    }
                    first_error.get_or_insert(err);
                }
                None => {
                    first_error.get_or_insert(AssetError::WorkerLost(name.clone()));
                }
            }
        }

        match (policy, first_error) {
            (_, None) => Ok(images),
            (LoadPolicy::Fail, Some(err)) => Err(Error::Asset(err)),
            (LoadPolicy::Skip, Some(err)) if images.is_empty() => Err(Error::Asset(err)),
            (LoadPolicy::Skip, Some(_)) => Ok(images),
        }
    }

    fn record(&mut self, completion: Completion) -> bool {
        let Completion { index, result } = completion;
        let total = self.slots.len();
        if !matches!(self.slots.get(index), Some(None)) {
            return false;
        }

        match &result {
            Ok(image) => log::debug!(
                "Loaded '{}' ({}x{}), {} of {}",
                self.names[index],
                image.width(),
                image.height(),
                self.completion_order.len() + 1,
                total
            ),
            Err(err) => log::debug!("Load of '{}' failed: {err}", self.names[index]),
        }

        self.slots[index] = Some(result);
        self.completion_order.push(index);
        self.latch.count_down()
    }

    fn abandon_pending(&mut self, make_error: impl Fn(String) -> AssetError) {
        let pending: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.is_none().then_some(i))
            .collect();
        for index in pending {
            let error = make_error(self.names[index].clone());
            self.record(Completion {
                index,
                result: Err(error),
            });
        }
    }
}

impl std::fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLoader")
            .field("total", &self.total())
            .field("pending", &self.pending())
            .field("completion_order", &self.completion_order)
            .finish_non_exhaustive()
    }
}

/// Loads every source and waits for all of them, applying `policy`.
pub fn load_images(
    sources: &[ImageSource],
    policy: LoadPolicy,
    timeout: Duration,
) -> Result<Vec<Image>> {
    if sources.is_empty() {
        return Err(Error::NoImages);
    }
    let mut loader = ImageLoader::spawn(sources);
    loader.wait(timeout);
    loader.finish(policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_ignores_duplicate_and_unknown_completions() {
        let a = Image::solid("a", 1, 1, [0; 4]);
        let b = Image::solid("b", 1, 1, [0; 4]);
        let sources = [ImageSource::from(a.clone()), ImageSource::from(b)];
        let mut loader = ImageLoader::spawn(&sources);

        assert!(!loader.record(Completion {
            index: 0,
            result: Ok(a.clone()),
        }));
        assert_eq!(loader.pending(), 1);

        assert!(!loader.record(Completion {
            index: 0,
            result: Err(AssetError::WorkerLost("a".into())),
        }));
        assert!(!loader.record(Completion {
            index: 9,
            result: Ok(a),
        }));
        assert_eq!(loader.pending(), 1);

        // The queued completion for index 0 is a duplicate; index 1 opens the latch.
        assert!(loader.poll());
        assert_eq!(loader.completion_order(), &[0, 1]);
        let images = loader.finish(LoadPolicy::Fail).unwrap();
        assert_eq!(images[0].label(), "a");
    }
}

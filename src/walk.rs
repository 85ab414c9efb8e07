//! Filesystem walker (§C6): drives [`crate::matcher::Matcher`] over an
//! actual directory tree using `walkdir`, the way the teacher's own
//! `walker.rs` paired its matcher with `WalkDir`.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ahash::AHashSet;
use walkdir::WalkDir;

use crate::error::Result;
use crate::flags::MatchFlags;
use crate::matcher::Matcher;

/// Cooperative cancellation handle for a long-running walk. Cloning shares
/// the same underlying flag, so a walk can be aborted from another thread.
#[derive(Clone, Default)]
pub struct CancelToken {
    aborted: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kill(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.aborted.store(false, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

/// Called for every I/O error the walk encounters (e.g. a directory it
/// lacks permission to read). Returning `false` aborts the walk early.
pub type OnError<'a> = dyn Fn(&Path, &std::io::Error) -> bool + 'a;

/// Walk `root`, yielding every path under it that `matcher` accepts.
pub struct Walker<'a> {
    matcher: &'a Matcher,
    root: PathBuf,
    cancel: CancelToken,
    on_error: Option<Box<OnError<'a>>>,
    capacity_hint: Option<usize>,
}

impl<'a> Walker<'a> {
    pub fn new(matcher: &'a Matcher, root: impl Into<PathBuf>) -> Self {
        Walker {
            matcher,
            root: root.into(),
            cancel: CancelToken::new(),
            on_error: None,
            capacity_hint: None,
        }
    }

    /// Build a walker seeded from a [`crate::config::Config`]'s
    /// `readdir_cache_capacity`, instead of estimating it by reading the
    /// root directory once up front.
    pub fn with_config(matcher: &'a Matcher, root: impl Into<PathBuf>, config: &crate::config::Config) -> Self {
        Walker::new(matcher, root).capacity_hint(config.readdir_cache_capacity.get())
    }

    /// Override the dedup set's initial capacity instead of estimating it
    /// from the root directory's entry count.
    pub fn capacity_hint(mut self, capacity: usize) -> Self {
        self.capacity_hint = Some(capacity);
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn on_error(mut self, handler: impl Fn(&Path, &std::io::Error) -> bool + 'a) -> Self {
        self.on_error = Some(Box::new(handler));
        self
    }

    /// Run the walk to completion, returning every accepted path.
    ///
    /// Honors `NODIR` (omit directory entries), `MARK` (append the platform
    /// separator to directory results), `FOLLOW` (traverse symlinked
    /// directories instead of reporting them as leaves), and `SCANDOTDIR`
    /// (synthesize `.`/`..` entries inside each scanned directory).
    /// De-duplicates results with an `AHashSet` since `MATCHBASE` and
    /// overlapping include patterns can otherwise report the same path
    /// twice, unless `NOUNIQUE` is set. Buffers the whole walk in memory;
    /// use [`Self::iter`] to consume matches as they're found instead.
    pub fn run(&self) -> Result<Vec<String>> {
        self.iter().collect()
    }

    /// Stream matches lazily as the walk progresses, instead of collecting
    /// the whole tree up front. Honors the same flags as [`Self::run`].
    pub fn iter(&self) -> WalkIter<'_> {
        let flags = self.matcher.flags();
        // `GLOBSTARLONG`'s `***` traverses symlinks on its own, without
        // requiring `FOLLOW` too.
        let follow_links = flags.contains(MatchFlags::FOLLOW) || flags.contains(MatchFlags::GLOBSTARLONG);
        WalkIter {
            matcher: self.matcher,
            root: self.root.clone(),
            cancel: self.cancel.clone(),
            on_error: self.on_error.as_deref(),
            inner: WalkDir::new(&self.root).follow_links(follow_links).into_iter(),
            nodir: flags.contains(MatchFlags::NODIR),
            mark: flags.contains(MatchFlags::MARK),
            nounique: flags.contains(MatchFlags::NOUNIQUE),
            scandotdir: flags.contains(MatchFlags::SCANDOTDIR),
            realpath: flags.contains(MatchFlags::REALPATH),
            seen: AHashSet::with_capacity(
                self.capacity_hint.unwrap_or_else(|| estimate_capacity(&self.root)),
            ),
            pending: VecDeque::new(),
        }
    }
}

/// Lazy, `Iterator`-based walk driver returned by [`Walker::iter`]. Each
/// call to `next` advances the underlying `walkdir` traversal by exactly as
/// much as it needs to produce the next accepted path (plus any pending
/// `SCANDOTDIR` entries queued alongside the directory that produced them).
pub struct WalkIter<'a> {
    matcher: &'a Matcher,
    root: PathBuf,
    cancel: CancelToken,
    on_error: Option<&'a OnError<'a>>,
    inner: walkdir::IntoIter,
    nodir: bool,
    mark: bool,
    nounique: bool,
    scandotdir: bool,
    realpath: bool,
    seen: AHashSet<String>,
    pending: VecDeque<String>,
}

impl<'a> Iterator for WalkIter<'a> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(queued) = self.pending.pop_front() {
                return Some(Ok(queued));
            }

            if self.cancel.is_aborted() {
                tracing::debug!(root = %self.root.display(), "walk aborted via cancel token");
                return None;
            }

            let entry = match self.inner.next() {
                None => return None,
                Some(Ok(entry)) => entry,
                Some(Err(err)) => {
                    let path = err.path().unwrap_or(&self.root).to_path_buf();
                    let io_err = std::io::Error::new(std::io::ErrorKind::Other, err.to_string());
                    let keep_going = self.on_error.map(|handler| handler(&path, &io_err)).unwrap_or(true);
                    tracing::warn!(path = %path.display(), error = %io_err, "walk entry error");
                    if !keep_going {
                        return Some(Err(crate::error::GlobError::Filesystem {
                            path,
                            source: io_err,
                        }));
                    }
                    continue;
                }
            };

            let is_dir = entry.file_type().is_dir();
            if is_dir && entry.depth() == 0 {
                continue;
            }
            if is_dir && self.nodir {
                continue;
            }

            let relative = match entry.path().strip_prefix(&self.root) {
                Ok(rel) => rel,
                Err(_) => entry.path(),
            };
            let candidate = relative.to_string_lossy().replace('\\', "/");

            let matched = if self.realpath {
                self.matcher.is_match_real_fs(&candidate, &self.root)
            } else {
                self.matcher.is_match(&candidate)
            };
            let matched = match matched {
                Ok(b) => b,
                Err(e) => return Some(Err(e)),
            };

            let mut emit = None;
            if matched {
                let mut display = candidate.clone();
                if self.mark && is_dir {
                    display.push('/');
                }
                if self.nounique || self.seen.insert(candidate.clone()) {
                    emit = Some(display);
                }
            }

            if self.scandotdir && is_dir {
                for synthetic in [".", ".."] {
                    let dot_candidate = format!("{candidate}/{synthetic}");
                    let dot_matched = match self.matcher.is_match(&dot_candidate) {
                        Ok(b) => b,
                        Err(e) => return Some(Err(e)),
                    };
                    if dot_matched && (self.nounique || self.seen.insert(dot_candidate.clone())) {
                        self.pending.push_back(dot_candidate);
                    }
                }
            }

            if let Some(display) = emit {
                return Some(Ok(display));
            }
        }
    }
}

fn estimate_capacity(root: &Path) -> usize {
    std::fs::read_dir(root)
        .map(|entries| entries.count().saturating_mul(8).max(64))
        .unwrap_or(64)
}

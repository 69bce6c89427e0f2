//! Async batch decoding module
//!
//! This module decodes many archive entries concurrently. Payloads are read
//! through the archive first, then every decode runs on the blocking pool
//! with its own state, so one entry's failure never touches another.

#[cfg(feature = "async")]
/// Concurrent entry decoding with a configurable concurrency limit
pub mod processor {
    use crate::decode::{self, Raster};
    use crate::{Archive, Result, TexPakError, TextureHeader};
    use futures::stream::{self, StreamExt};
    use std::io::{Read, Seek};

    /// Result of one entry in a batch, tagged with its name
    pub type EntryResult = (String, Result<Raster>);

    /// Concurrent entry decoder optimized for throughput
    #[derive(Debug, Clone)]
    pub struct AsyncBatchDecoder {
        concurrency_limit: usize,
    }

    impl AsyncBatchDecoder {
        /// Create a new batch decoder with one task per CPU
        pub fn new() -> Self {
            Self {
                concurrency_limit: num_cpus::get(),
            }
        }

        /// Set the concurrency limit
        pub fn with_concurrency(mut self, limit: usize) -> Self {
            self.concurrency_limit = limit.max(1);
            self
        }

        /// Current concurrency limit
        pub fn concurrency(&self) -> usize {
            self.concurrency_limit
        }

        /// Decode the named entries concurrently
        ///
        /// Results come back in the order of `names`.
        pub async fn decode_entries<R, S>(
            &self,
            archive: &mut Archive<R>,
            names: &[S],
        ) -> Vec<EntryResult>
        where
            R: Read + Seek,
            S: AsRef<str>,
        {
            let mut jobs = Vec::with_capacity(names.len());
            for name in names {
                let name = name.as_ref();
                let job = archive
                    .resolve(name)
                    .and_then(|header| Ok((header, archive.read_payload(&header)?)));
                jobs.push((name.to_string(), job));
            }

            let mut results: Vec<(usize, EntryResult)> =
                stream::iter(jobs.into_iter().enumerate().map(|(i, (name, job))| async move {
                    let result = match job {
                        Ok((header, words)) => Self::decode_blocking(header, words).await,
                        Err(err) => Err(err),
                    };
                    if let Err(err) = &result {
                        log::warn!("failed to decode {name}: {err}");
                    }
                    (i, (name, result))
                }))
                .buffer_unordered(self.concurrency_limit)
                .collect()
                .await;

            results.sort_by_key(|(i, _)| *i);
            results.into_iter().map(|(_, result)| result).collect()
        }

        /// Decode every entry of the archive concurrently, in directory order
        pub async fn decode_all<R: Read + Seek>(
            &self,
            archive: &mut Archive<R>,
        ) -> Vec<EntryResult> {
            let names: Vec<String> = archive.entries().iter().map(|e| e.name.clone()).collect();
            self.decode_entries(archive, &names).await
        }

        /// Run one decode on the blocking thread pool
        async fn decode_blocking(header: TextureHeader, words: Vec<u32>) -> Result<Raster> {
            tokio::task::spawn_blocking(move || decode::decode(&header, &words))
                .await
                .map_err(|err| TexPakError::Io(std::io::Error::other(err)))?
        }
    }

    impl Default for AsyncBatchDecoder {
        fn default() -> Self {
            Self::new()
        }
    }
}

#[cfg(feature = "async")]
pub use processor::AsyncBatchDecoder;

pub const DEFAULT_DEPTH: usize = 2;
pub const MAX_DEPTH: usize = 8;
pub const MAX_THREADS: usize = 256;

/// How deep and on how many threads a search runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchLimits {
    pub depth: usize, // 0 evaluates the replies statically
    pub threads: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            threads: 1,
        }
    }
}

/// Parameters of a `go` command; unset ones fall back to the controller's settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub depth: Option<usize>,   // search to depth x
    pub threads: Option<usize>, // split the root moves over x threads
}

impl SearchParams {
    pub fn parse(params: Vec<String>) -> Self {
        let mut search_params = SearchParams::default();
        let mut iter = params.iter();

        while let Some(param) = iter.next() {
            match param.as_str() {
                "depth" => {
                    if let Some(value) = iter.next() {
                        search_params.depth = value.parse().ok().filter(|depth| *depth <= MAX_DEPTH);
                    }
                }
                "threads" => {
                    if let Some(value) = iter.next() {
                        search_params.threads = value
                            .parse()
                            .ok()
                            .filter(|threads| (1..=MAX_THREADS).contains(threads));
                    }
                }
                _ => {
                    log::warn!("Unknown go parameter: {}", param);
                }
            }
        }

        search_params
    }

    pub fn limits(&self, defaults: SearchLimits) -> SearchLimits {
        SearchLimits {
            depth: self.depth.unwrap_or(defaults.depth),
            threads: self.threads.unwrap_or(defaults.threads),
        }
    }
}

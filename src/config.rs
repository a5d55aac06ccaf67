use serde::Deserialize;

use crate::{
    cache::{Cache, IsCache},
    error::CacheError,
    prefetch::{
        adjacent::Adjacent, null::Null, sequential::Sequential, stride::Stride,
        stride_vote::StrideVote, Prefetch,
    },
    replace::{lru::Lru, lru_clean::LruPreferClean, random::Random},
};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReplConfig {
    Lru,
    #[serde(alias = "random")]
    Rand,
    #[serde(alias = "lru_clean")]
    LruPreferClean,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrefetchConfig {
    #[default]
    Null,
    Sequential {
        #[serde(alias = "amount")]
        prefetch_amount: u32,
    },
    Adjacent,
    Stride,
    StrideVote,
}

impl PrefetchConfig {
    pub fn build(self) -> Box<dyn Prefetch> {
        match self {
            PrefetchConfig::Null => Box::new(Null),
            PrefetchConfig::Sequential { prefetch_amount } => {
                Box::new(Sequential::new(prefetch_amount))
            }
            PrefetchConfig::Adjacent => Box::new(Adjacent),
            PrefetchConfig::Stride => Box::new(Stride::new()),
            PrefetchConfig::StrideVote => Box::new(StrideVote::new()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CacheConfig {
    name: String,
    size: usize,
    ways: usize,
    repl: ReplConfig,
    #[serde(default)]
    prefetch: PrefetchConfig,
    seed: Option<u64>,
}

impl CacheConfig {
    fn n_sets(&self, line_size: usize) -> Result<usize, CacheError> {
        if self.size == 0 {
            return Err(CacheError::ZeroDimension { what: "cache size" });
        }
        if line_size == 0 {
            return Err(CacheError::ZeroDimension { what: "line size" });
        }
        if self.ways == 0 {
            return Err(CacheError::ZeroDimension {
                what: "associativity",
            });
        }
        let set_bytes = line_size * self.ways;
        if self.size % set_bytes != 0 {
            return Err(CacheError::UnevenGeometry {
                size: self.size,
                line_size,
                ways: self.ways,
            });
        }
        Ok(self.size / set_bytes)
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    line_size: usize,
    caches: Vec<CacheConfig>,
}

impl Config {
    pub fn to_caches(self) -> Result<Vec<Box<dyn IsCache>>, CacheError> {
        let line_size = self.line_size;
        self.caches
            .into_iter()
            .map(|cc| {
                let n_sets = cc.n_sets(line_size)?;
                let prefetcher = cc.prefetch.build();
                let cache = match cc.repl {
                    ReplConfig::Lru => Box::new(Cache::new(
                        cc.name,
                        line_size,
                        n_sets,
                        cc.ways,
                        Lru::new(n_sets, cc.ways),
                        prefetcher,
                    )?) as Box<dyn IsCache>,
                    ReplConfig::Rand => Box::new(Cache::new(
                        cc.name,
                        line_size,
                        n_sets,
                        cc.ways,
                        cc.seed.map_or_else(Random::new, Random::with_seed),
                        prefetcher,
                    )?) as Box<dyn IsCache>,
                    ReplConfig::LruPreferClean => Box::new(Cache::new(
                        cc.name,
                        line_size,
                        n_sets,
                        cc.ways,
                        LruPreferClean::new(n_sets, cc.ways),
                        prefetcher,
                    )?) as Box<dyn IsCache>,
                };
                Ok(cache)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cache::Op;

    fn parse(json: &str) -> Config {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn builds_every_policy() {
        let config = parse(
            r#"{
                "line_size": 64,
                "caches": [
                    { "name": "a", "size": 4096, "ways": 4, "repl": "lru" },
                    { "name": "b", "size": 4096, "ways": 4, "repl": "random", "seed": 3,
                      "prefetch": { "kind": "sequential", "amount": 2 } },
                    { "name": "c", "size": 4096, "ways": 4, "repl": "lru_prefer_clean",
                      "prefetch": { "kind": "stride" } }
                ]
            }"#,
        );
        let mut caches = config.to_caches().unwrap();
        let names: Vec<_> = caches.iter().map(|c| c.name().to_owned()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        for cache in &mut caches {
            cache.access(0x40, Op::Read).unwrap();
        }
        assert_eq!(caches[1].make_stats().prefetches, 2);
        assert_eq!(caches[0].make_stats().misses, 1);
    }

    #[test]
    fn prefetch_kinds() {
        let kinds: Vec<PrefetchConfig> = serde_json::from_str(
            r#"[ { "kind": "null" }, { "kind": "adjacent" },
                 { "kind": "sequential", "prefetch_amount": 0 },
                 { "kind": "stride_vote" } ]"#,
        )
        .unwrap();
        assert_eq!(
            kinds,
            vec![
                PrefetchConfig::Null,
                PrefetchConfig::Adjacent,
                PrefetchConfig::Sequential { prefetch_amount: 0 },
                PrefetchConfig::StrideVote,
            ]
        );
    }

    #[test]
    fn rejects_bad_geometry() {
        let uneven = parse(
            r#"{ "line_size": 64,
                 "caches": [ { "name": "x", "size": 1000, "ways": 2, "repl": "lru" } ] }"#,
        );
        assert!(matches!(
            uneven.to_caches(),
            Err(CacheError::UnevenGeometry { size: 1000, .. })
        ));

        let no_ways = parse(
            r#"{ "line_size": 64,
                 "caches": [ { "name": "x", "size": 1024, "ways": 0, "repl": "lru" } ] }"#,
        );
        assert!(matches!(
            no_ways.to_caches(),
            Err(CacheError::ZeroDimension { what: "associativity" })
        ));

        // 3 sets
        let odd_sets = parse(
            r#"{ "line_size": 64,
                 "caches": [ { "name": "x", "size": 384, "ways": 2, "repl": "lru" } ] }"#,
        );
        assert!(matches!(
            odd_sets.to_caches(),
            Err(CacheError::NotPowerOfTwo { value: 3, .. })
        ));
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        let result: Result<Config, _> = serde_json::from_str(
            r#"{ "line_size": 64,
                 "caches": [ { "name": "x", "size": 1024, "ways": 2, "repl": "fifo" } ] }"#,
        );
        assert!(result.is_err());
    }
}

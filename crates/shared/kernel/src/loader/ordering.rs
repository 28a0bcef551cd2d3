use super::error::LoaderError;
use apanel_domain::modules::{ModuleConfigValue, ModuleConfiguration};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt::Debug;

/// Produces the order in which configured modules are instantiated.
pub trait DependencyOrdering: Debug + Send + Sync {
    /// Returns configuration keys in load order.
    ///
    /// Keys absent from `config` are ignored by the loader; keys omitted from the
    /// result are not loaded.
    ///
    /// # Errors
    /// Returns [`LoaderError::DependencyCycle`] if no order satisfies the declared edges.
    fn order(&self, config: &ModuleConfiguration) -> Result<Vec<String>, LoaderError>;
}

/// Topological ordering over `before` / `after` edges.
///
/// Among entries whose dependencies are satisfied the one listed first in the
/// configuration goes first, so the result is deterministic and equals file order
/// when no edges are declared. References to unknown keys are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct DependencyOrderingService;

impl DependencyOrdering for DependencyOrderingService {
    fn order(&self, config: &ModuleConfiguration) -> Result<Vec<String>, LoaderError> {
        let keys: Vec<&str> = config.keys().collect();
        let index_of = |key: &str| keys.iter().position(|k| *k == key);

        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); keys.len()];
        let mut in_degree = vec![0_usize; keys.len()];
        let mut add_edge = |from: usize, to: usize| {
            if from != to && !successors[from].contains(&to) {
                successors[from].push(to);
                in_degree[to] += 1;
            }
        };

        for (index, (_, value)) in config.iter().enumerate() {
            let ModuleConfigValue::Entry(entry) = value else { continue };
            for target in entry.before.iter().filter_map(|key| index_of(key)) {
                add_edge(index, target);
            }
            for source in entry.after.iter().filter_map(|key| index_of(key)) {
                add_edge(source, index);
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> =
            (0..keys.len()).filter(|i| in_degree[*i] == 0).map(Reverse).collect();
        let mut ordered = Vec::with_capacity(keys.len());

        while let Some(Reverse(current)) = ready.pop() {
            ordered.push(keys[current].to_owned());
            for &next in &successors[current] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if ordered.len() != keys.len() {
            let cyclic: Vec<&str> =
                (0..keys.len()).filter(|i| in_degree[*i] > 0).map(|i| keys[i]).collect();
            return Err(LoaderError::DependencyCycle {
                message: cyclic.join(", ").into(),
                context: None,
            });
        }

        Ok(ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apanel_domain::modules::ModuleConfigEntry;

    fn order(config: &ModuleConfiguration) -> Vec<String> {
        DependencyOrderingService.order(config).unwrap()
    }

    #[test]
    fn keeps_configuration_order_without_edges() {
        let config = ModuleConfiguration::new()
            .with("preview", ModuleConfigEntry::new("a"))
            .with("cache", ModuleConfigEntry::new("b"))
            .with("info", ModuleConfigEntry::new("c"));
        assert_eq!(order(&config), ["preview", "cache", "info"]);
    }

    #[test]
    fn honours_before_and_after() {
        let config = ModuleConfiguration::new()
            .with("preview", ModuleConfigEntry::new("a").after(["info"]))
            .with("cache", ModuleConfigEntry::new("b"))
            .with("info", ModuleConfigEntry::new("c").after(["cache"]))
            .with("tsdebug", ModuleConfigEntry::new("d").before(["cache"]));
        assert_eq!(order(&config), ["tsdebug", "cache", "info", "preview"]);
    }

    #[test]
    fn ignores_unknown_references_and_self_edges() {
        let config = ModuleConfiguration::new()
            .with("preview", ModuleConfigEntry::new("a").after(["nowhere", "preview"]))
            .with("cache", ModuleConfigEntry::new("b").before(["missing"]));
        assert_eq!(order(&config), ["preview", "cache"]);
    }

    #[test]
    fn malformed_rows_keep_their_slot() {
        let config = ModuleConfiguration::new()
            .with_malformed("broken")
            .with("cache", ModuleConfigEntry::new("b"));
        assert_eq!(order(&config), ["broken", "cache"]);
    }

    #[test]
    fn reports_cycles() {
        let config = ModuleConfiguration::new()
            .with("preview", ModuleConfigEntry::new("a").after(["cache"]))
            .with("cache", ModuleConfigEntry::new("b").after(["preview"]))
            .with("info", ModuleConfigEntry::new("c"));
        let err = DependencyOrderingService.order(&config).unwrap_err();
        assert_eq!(err.code(), Some(1_381_960_494));
        assert!(err.to_string().contains("preview, cache"));
    }
}

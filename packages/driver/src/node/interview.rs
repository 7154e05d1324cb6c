use crate::driver::InterviewStage;
use crate::error::{Error, Result};
use crate::node::cc_api::{CCInterviewContext, CCInterviewError, cc_api_for};
use crate::{Driver, Node};
use futures::StreamExt;
use petgraph::Direction;
use petgraph::graphmap::DiGraphMap;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;
use tokio_util::sync::CancellationToken;
use zw_core::prelude::*;
use zw_serial::command::GetNodeProtocolInfoRequest;

/// How many nodes are interviewed at the same time. Within one node the
/// interview is strictly sequential.
const INTERVIEW_CONCURRENCY: usize = 4;

impl Driver {
    /// Interviews every node in the network except the controller itself,
    /// in parallel with bounded concurrency
    pub async fn interview_nodes(&self, cancel: &CancellationToken) -> Result<()> {
        let own_node_id = self.storage().controller_info().map(|info| info.own_node_id);
        let node_ids: Vec<NodeId> = self
            .storage()
            .node_ids()
            .into_iter()
            .filter(|node_id| Some(*node_id) != own_node_id)
            .collect();

        futures::stream::iter(node_ids)
            .for_each_concurrent(INTERVIEW_CONCURRENCY, |node_id| async move {
                let node = Node::new(node_id, self);
                if let Err(e) = node.interview(cancel).await {
                    self.node_log(node_id)
                        .error(|| format!("interview failed: {}", e));
                }
            })
            .await;

        Ok(())
    }
}

impl Node<'_> {
    /// Drives this node through its interview: protocol info, node info and
    /// the dependency-ordered command class interviews. Individual CC
    /// failures are recorded and do not abort the remaining steps.
    pub async fn interview(&self, cancel: &CancellationToken) -> Result<()> {
        let driver = self.driver();
        let log = driver.node_log(self.id());
        log.info(|| {
            format!(
                "beginning interview, current stage: {:?}",
                self.interview_stage()
            )
        });

        self.set_interview_stage(InterviewStage::InProgress);
        driver.storage().write_node(self.id(), |node| {
            node.interview_errors.clear();
        });

        // The protocol data is usually known from startup, fetch it if not
        if self.protocol_data().is_none() {
            let response = driver
                .exec_controller_command(GetNodeProtocolInfoRequest::new(self.id()), None)
                .await;
            match response {
                Ok(Some(zw_serial::command::Command::GetNodeProtocolInfoResponse(info))) => {
                    driver.storage().write_node(self.id(), |node| {
                        node.protocol_data = Some(info.protocol_data.clone());
                    });
                }
                _ => return Err(Error::Internal),
            }
        }

        // Ask the node which CCs it supports and attach the instances
        if self.supported_command_classes().is_empty() {
            let node_info = driver.request_node_info(self.id(), cancel).await?;
            driver.storage().write_node(self.id(), |node| {
                for cc in &node_info.supported_command_classes {
                    node.cc_state.entry(*cc).or_default().info.set_supported(true);
                }
                for cc in &node_info.controlled_command_classes {
                    node.cc_state.entry(*cc).or_default().info.set_controlled(true);
                }
            });
        }

        // Interview the CCs in dependency order
        let ccs = self.supported_command_classes();
        let order = topological_cc_order(&ccs, |cc| {
            log.warn(|| {
                format!(
                    "dependency cycle among command classes, continuing with CC {}",
                    cc
                )
            });
        });
        log.silly(|| {
            format!(
                "interview order:{}",
                order.iter().fold(String::new(), |mut acc, cc| {
                    write!(acc, "\n· {}", cc).unwrap();
                    acc
                })
            )
        });

        for cc in order {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let ctx = CCInterviewContext {
                driver,
                node_id: self.id(),
                cancel: cancel.clone(),
            };
            let result = cc_api_for(cc).interview(&ctx).await;
            match result {
                Ok(()) => {}
                Err(CCInterviewError::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    log.warn(|| format!("interview of CC {} failed: {}", cc, e));
                    driver.storage().write_node(self.id(), |node| {
                        node.interview_errors.push((cc, e.to_string()));
                    });
                }
            }
        }

        let stage = if self.interview_errors().is_empty() {
            InterviewStage::Complete
        } else {
            InterviewStage::PartiallyComplete
        };
        self.set_interview_stage(stage);
        log.info(|| format!("interview finished: {:?}", stage));

        Ok(())
    }
}

/// Computes a topological order over the given CCs using their declared
/// dependencies. Ties break stably by numeric CC ID; the Version CC always
/// goes first. Dependency cycles are broken by dropping the back-edges into
/// the lowest remaining CC, reported through `on_cycle`.
fn topological_cc_order(
    ccs: &[CommandClasses],
    mut on_cycle: impl FnMut(CommandClasses),
) -> Vec<CommandClasses> {
    let mut graph: DiGraphMap<CommandClasses, ()> = DiGraphMap::new();
    for cc in ccs {
        graph.add_node(*cc);
    }
    for cc in ccs {
        for dep in cc_api_for(*cc).dependencies() {
            // Dependencies the node does not support are considered satisfied
            if dep != cc && graph.contains_node(*dep) {
                graph.add_edge(*dep, *cc, ());
            }
        }
    }

    let mut indegree: BTreeMap<CommandClasses, usize> = graph
        .nodes()
        .map(|cc| (cc, graph.neighbors_directed(cc, Direction::Incoming).count()))
        .collect();
    let mut ready: BTreeSet<CommandClasses> = indegree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(cc, _)| *cc)
        .collect();

    let mut order = Vec::with_capacity(indegree.len());
    while !indegree.is_empty() {
        let next = if ready.contains(&CommandClasses::Version) {
            // Version is pinned to the front
            CommandClasses::Version
        } else if let Some(next) = ready.iter().next() {
            *next
        } else {
            // Dependency cycle. Force the lowest remaining CC, dropping its
            // unsatisfied edges.
            let next = *indegree
                .keys()
                .next()
                .expect("non-empty in-degree map has a first key");
            on_cycle(next);
            next
        };

        ready.remove(&next);
        indegree.remove(&next);
        order.push(next);

        for successor in graph.neighbors_directed(next, Direction::Outgoing) {
            if let Some(degree) = indegree.get_mut(&successor) {
                *degree = degree.saturating_sub(1);
                if *degree == 0 {
                    ready.insert(successor);
                }
            }
        }
    }

    order
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_version_goes_first() {
        let order = topological_cc_order(
            &[
                CommandClasses::BinarySwitch,
                CommandClasses::Basic,
                CommandClasses::Version,
            ],
            |_| panic!("no cycle expected"),
        );
        assert_eq!(
            order,
            vec![
                CommandClasses::Version,
                CommandClasses::Basic,
                CommandClasses::BinarySwitch,
            ]
        );
    }

    #[test]
    fn test_stable_tie_break_by_cc_id() {
        // Everything except Version depends only on Version, so the rest
        // must come out in numeric order
        let order = topological_cc_order(
            &[
                CommandClasses::Meter,
                CommandClasses::Version,
                CommandClasses::Battery,
                CommandClasses::Basic,
            ],
            |_| panic!("no cycle expected"),
        );
        assert_eq!(
            order,
            vec![
                CommandClasses::Version,
                CommandClasses::Basic,
                CommandClasses::Meter,
                CommandClasses::Battery,
            ]
        );
    }

    #[test]
    fn test_missing_dependency_is_ignored() {
        // Without Version in the list, the implicit dependency on it must
        // not block anything
        let order = topological_cc_order(
            &[CommandClasses::BinarySwitch, CommandClasses::Basic],
            |_| panic!("no cycle expected"),
        );
        assert_eq!(
            order,
            vec![CommandClasses::Basic, CommandClasses::BinarySwitch]
        );
    }
}

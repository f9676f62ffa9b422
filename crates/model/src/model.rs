//! The shared model: hierarchy registry and state bookkeeping.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::entity::{Cluster, Domain, Element, Instance, Solution, SolutionVersion};
use crate::error::{Error, Result};
use crate::state::State;
use crate::target::{CurrentState, InstancePath, TargetState};

/// Shared registry of all managed entities.
///
/// Read by the dispatcher and external query paths; target state is mutated
/// only through the external API, observed state only by the dispatcher.
/// Callers never hold the lock across a controller call: they snapshot,
/// release, call, then commit.
#[derive(Default)]
pub struct Model {
    domains: RwLock<HashMap<String, Domain>>,
}

fn find_instance<'a>(
    domains: &'a HashMap<String, Domain>,
    path: &InstancePath,
) -> Result<&'a Instance> {
    domains
        .get(&path.domain)
        .ok_or_else(|| Error::UnknownDomain {
            name: path.domain.clone(),
        })?
        .solutions
        .get(&path.solution)
        .ok_or_else(|| Error::UnknownSolution {
            name: path.solution.clone(),
        })?
        .versions
        .get(&path.version)
        .ok_or_else(|| Error::UnknownVersion {
            solution: path.solution.clone(),
            version: path.version.clone(),
        })?
        .elements
        .get(&path.element)
        .ok_or_else(|| Error::UnknownElement {
            name: path.element.clone(),
        })?
        .clusters
        .get(&path.cluster)
        .ok_or_else(|| Error::UnknownCluster {
            name: path.cluster.clone(),
        })?
        .instances
        .get(&path.instance)
        .ok_or_else(|| Error::UnknownInstance {
            name: path.instance.clone(),
        })
}

fn find_cluster_mut<'a>(
    domains: &'a mut HashMap<String, Domain>,
    path: &InstancePath,
) -> Result<(&'a mut Cluster, String)> {
    let element = domains
        .get_mut(&path.domain)
        .ok_or_else(|| Error::UnknownDomain {
            name: path.domain.clone(),
        })?
        .solutions
        .get_mut(&path.solution)
        .ok_or_else(|| Error::UnknownSolution {
            name: path.solution.clone(),
        })?
        .versions
        .get_mut(&path.version)
        .ok_or_else(|| Error::UnknownVersion {
            solution: path.solution.clone(),
            version: path.version.clone(),
        })?
        .elements
        .get_mut(&path.element)
        .ok_or_else(|| Error::UnknownElement {
            name: path.element.clone(),
        })?;

    let component = element.component.clone();
    let cluster = element
        .clusters
        .get_mut(&path.cluster)
        .ok_or_else(|| Error::UnknownCluster {
            name: path.cluster.clone(),
        })?;

    Ok((cluster, component))
}

fn find_instance_mut<'a>(
    domains: &'a mut HashMap<String, Domain>,
    path: &InstancePath,
) -> Result<&'a mut Instance> {
    let (cluster, _) = find_cluster_mut(domains, path)?;
    cluster
        .instances
        .get_mut(&path.instance)
        .ok_or_else(|| Error::UnknownInstance {
            name: path.instance.clone(),
        })
}

impl Model {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a domain.
    pub async fn add_domain(&self, name: &str) -> Result<()> {
        let mut domains = self.domains.write().await;
        if domains.contains_key(name) {
            return Err(Error::duplicate("domain", name));
        }
        domains.insert(name.to_owned(), Domain::new(name));
        Ok(())
    }

    /// Add a version of a solution to a domain, creating the solution on
    /// first use.
    pub async fn add_solution(&self, domain: &str, solution: &str, version: &str) -> Result<()> {
        let mut domains = self.domains.write().await;
        let domain = domains
            .get_mut(domain)
            .ok_or_else(|| Error::UnknownDomain {
                name: domain.to_owned(),
            })?;

        let solution = domain
            .solutions
            .entry(solution.to_owned())
            .or_insert_with(|| Solution::new(solution));

        if solution.versions.contains_key(version) {
            return Err(Error::duplicate("version", version));
        }
        solution
            .versions
            .insert(version.to_owned(), SolutionVersion::new(version));
        Ok(())
    }

    /// Add an element with its component type to a solution version.
    pub async fn add_element(
        &self,
        domain: &str,
        solution: &str,
        version: &str,
        element: &str,
        component: &str,
    ) -> Result<()> {
        let mut domains = self.domains.write().await;
        let elements = &mut domains
            .get_mut(domain)
            .ok_or_else(|| Error::UnknownDomain {
                name: domain.to_owned(),
            })?
            .solutions
            .get_mut(solution)
            .ok_or_else(|| Error::UnknownSolution {
                name: solution.to_owned(),
            })?
            .versions
            .get_mut(version)
            .ok_or_else(|| Error::UnknownVersion {
                solution: solution.to_owned(),
                version: version.to_owned(),
            })?
            .elements;

        if elements.contains_key(element) {
            return Err(Error::duplicate("element", element));
        }
        elements.insert(element.to_owned(), Element::new(element, component));
        Ok(())
    }

    /// Add a cluster to an element.
    pub async fn add_cluster(
        &self,
        domain: &str,
        solution: &str,
        version: &str,
        element: &str,
        cluster: &str,
    ) -> Result<()> {
        let mut domains = self.domains.write().await;
        let parent = domains
            .get_mut(domain)
            .ok_or_else(|| Error::UnknownDomain {
                name: domain.to_owned(),
            })?
            .solutions
            .get_mut(solution)
            .ok_or_else(|| Error::UnknownSolution {
                name: solution.to_owned(),
            })?
            .versions
            .get_mut(version)
            .ok_or_else(|| Error::UnknownVersion {
                solution: solution.to_owned(),
                version: version.to_owned(),
            })?
            .elements
            .get_mut(element)
            .ok_or_else(|| Error::UnknownElement {
                name: element.to_owned(),
            })?;

        if parent.clusters.contains_key(cluster) {
            return Err(Error::duplicate("cluster", cluster));
        }
        parent
            .clusters
            .insert(cluster.to_owned(), Cluster::new(cluster));
        Ok(())
    }

    /// Add an instance to a cluster.
    ///
    /// The instance inherits the element's component type and starts with
    /// both target and observed state at `Initial`.
    pub async fn add_instance(&self, path: &InstancePath) -> Result<()> {
        let mut domains = self.domains.write().await;
        let (cluster, component) = find_cluster_mut(&mut domains, path)?;
        if cluster.instances.contains_key(&path.instance) {
            return Err(Error::duplicate("instance", path.instance.clone()));
        }
        cluster.instances.insert(
            path.instance.clone(),
            Instance::new(path.instance.clone(), component),
        );
        Ok(())
    }

    /// Set the desired state and configuration of an instance.
    ///
    /// External API only. Rejects non-requestable states, leaves the observed
    /// state untouched and clears the failure latch, allowing the dispatcher
    /// to act on the corrected target.
    pub async fn set_target(
        &self,
        path: &InstancePath,
        state: State,
        configuration: &str,
    ) -> Result<()> {
        if !state.is_requestable() {
            return Err(Error::InvalidTarget { state });
        }
        let mut domains = self.domains.write().await;
        let instance = find_instance_mut(&mut domains, path)?;
        instance.target_state = state;
        instance.target_configuration = configuration.to_owned();
        instance.latched = false;
        Ok(())
    }

    /// Snapshot the desired state of an instance.
    pub async fn target_state(&self, path: &InstancePath) -> Result<TargetState> {
        let domains = self.domains.read().await;
        let instance = find_instance(&domains, path)?;
        Ok(TargetState {
            path: path.clone(),
            component: instance.component.clone(),
            state: instance.target_state,
            configuration: instance.target_configuration.clone(),
        })
    }

    /// Snapshot the observed state of an instance.
    pub async fn current_state(&self, path: &InstancePath) -> Result<CurrentState> {
        let domains = self.domains.read().await;
        let instance = find_instance(&domains, path)?;
        Ok(CurrentState {
            path: path.clone(),
            component: instance.component.clone(),
            state: instance.state,
            configuration: instance.configuration.clone(),
            endpoint: instance.endpoint.clone(),
        })
    }

    /// The last error recorded for an instance, if any.
    pub async fn last_error(&self, path: &InstancePath) -> Result<Option<String>> {
        let domains = self.domains.read().await;
        Ok(find_instance(&domains, path)?.last_error.clone())
    }

    /// Whether the instance is latched in failure and excluded from
    /// automatic reconciliation.
    pub async fn is_latched(&self, path: &InstancePath) -> Result<bool> {
        let domains = self.domains.read().await;
        Ok(find_instance(&domains, path)?.latched)
    }

    /// Enter a transient state while an action is in flight.
    ///
    /// Dispatcher only; the observed configuration and endpoint stay as they
    /// were until the action result is committed.
    pub async fn set_transient(&self, path: &InstancePath, state: State) -> Result<()> {
        if !state.is_transient() {
            return Err(Error::InvalidTransient { state });
        }
        let mut domains = self.domains.write().await;
        let instance = find_instance_mut(&mut domains, path)?;
        instance.state = state;
        Ok(())
    }

    /// Commit the current state returned by a successful controller action.
    ///
    /// Clears the last error and the failure latch. The endpoint is kept only
    /// for states that may expose one; a committed `Undefined` additionally
    /// drops the applied configuration, since the backing resource is gone.
    pub async fn commit_current(&self, current: &CurrentState) -> Result<()> {
        let mut domains = self.domains.write().await;
        let instance = find_instance_mut(&mut domains, &current.path)?;
        instance.state = current.state;
        instance.configuration = current.configuration.clone();
        instance.endpoint = current.endpoint.clone();
        if !matches!(current.state, State::Active | State::Configuring) {
            instance.endpoint.clear();
        }
        if current.state == State::Undefined {
            instance.configuration.clear();
        }
        instance.last_error = None;
        instance.latched = false;
        Ok(())
    }

    /// Refresh configuration and endpoint reporting from a status result
    /// without advancing the lifecycle state.
    ///
    /// A status probe never raises a configuration from empty to non-empty
    /// and never discards a working value by reporting an empty one. The only
    /// state it may introduce is `Undefined`, when the backend reports the
    /// resource as gone. Returns the merged record.
    pub async fn refresh_current(
        &self,
        path: &InstancePath,
        reported: &CurrentState,
    ) -> Result<CurrentState> {
        let mut domains = self.domains.write().await;
        let instance = find_instance_mut(&mut domains, path)?;

        if reported.state == State::Undefined {
            instance.state = State::Undefined;
            instance.configuration.clear();
            instance.endpoint.clear();
        } else {
            if !instance.configuration.is_empty() && !reported.configuration.is_empty() {
                instance.configuration = reported.configuration.clone();
            }
            if instance.state == State::Active && !reported.endpoint.is_empty() {
                instance.endpoint = reported.endpoint.clone();
            }
        }

        Ok(CurrentState {
            path: path.clone(),
            component: instance.component.clone(),
            state: instance.state,
            configuration: instance.configuration.clone(),
            endpoint: instance.endpoint.clone(),
        })
    }

    /// Record a failed action: state becomes `Failure`, the message is kept
    /// for status queries, and the instance is latched against automatic
    /// retries. Last-good configuration and endpoint are preserved.
    pub async fn mark_failure(&self, path: &InstancePath, message: &str) -> Result<()> {
        let mut domains = self.domains.write().await;
        let instance = find_instance_mut(&mut domains, path)?;
        instance.state = State::Failure;
        instance.last_error = Some(message.to_owned());
        instance.latched = true;
        Ok(())
    }

    /// Remove an instance from the model.
    ///
    /// Only legal once a destroy action left the instance `Undefined`; the
    /// reconciliation loop never removes instances on its own.
    pub async fn remove_instance(&self, path: &InstancePath) -> Result<()> {
        let mut domains = self.domains.write().await;
        let (cluster, _) = find_cluster_mut(&mut domains, path)?;
        let instance = cluster
            .instances
            .get(&path.instance)
            .ok_or_else(|| Error::UnknownInstance {
                name: path.instance.clone(),
            })?;
        if instance.state != State::Undefined {
            return Err(Error::NotDestroyed {
                name: path.instance.clone(),
            });
        }
        cluster.instances.remove(&path.instance);
        Ok(())
    }

    /// Enumerate the paths of all instances.
    pub async fn instances(&self) -> Vec<InstancePath> {
        let domains = self.domains.read().await;
        let mut paths = Vec::new();
        for domain in domains.values() {
            for solution in domain.solutions.values() {
                for version in solution.versions.values() {
                    for element in version.elements.values() {
                        for cluster in element.clusters.values() {
                            for instance in cluster.instances.values() {
                                paths.push(InstancePath::new(
                                    domain.name.clone(),
                                    solution.name.clone(),
                                    version.version.clone(),
                                    element.name.clone(),
                                    cluster.name.clone(),
                                    instance.name.clone(),
                                ));
                            }
                        }
                    }
                }
            }
        }
        paths
    }

    /// Whether an instance exists at the given path.
    pub async fn contains(&self, path: &InstancePath) -> bool {
        let domains = self.domains.read().await;
        find_instance(&domains, path).is_ok()
    }
}

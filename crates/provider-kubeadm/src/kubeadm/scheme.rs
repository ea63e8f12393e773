//! Group/version/kind registry and the canonical YAML printer.
//!
//! Every object the provider serializes must be registered here; the
//! printer stamps `apiVersion`/`kind` from the registry rather than from
//! the object itself.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;
use serde_json::Value as JsonValue;
use serde_yaml::{Mapping, Value as YamlValue};

use super::{
    ClusterConfiguration, InitConfiguration, JoinConfiguration, KubeletConfiguration, Schema,
    V1Beta3, V1Beta4, KUBELET_API_VERSION,
};
use crate::error::{ProviderError, Result};

/// `apiVersion` + `kind` of a registered object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupVersionKind {
    pub api_version: &'static str,
    pub kind: &'static str,
}

/// Type-to-kind registry.
#[derive(Debug, Default)]
pub struct Scheme {
    kinds: HashMap<TypeId, GroupVersionKind>,
}

impl Scheme {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `T` to a group/version/kind.
    pub fn register<T: 'static>(&mut self, api_version: &'static str, kind: &'static str) {
        self.kinds
            .insert(TypeId::of::<T>(), GroupVersionKind { api_version, kind });
    }

    /// Kind bound to `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnregisteredKind`] if `T` was never registered.
    pub fn kind_for<T: 'static>(&self) -> Result<GroupVersionKind> {
        self.kinds
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or(ProviderError::UnregisteredKind(type_name::<T>()))
    }

    fn add_kubeadm<S: Schema>(&mut self) {
        self.register::<ClusterConfiguration<S>>(S::API_VERSION, "ClusterConfiguration");
        self.register::<InitConfiguration<S>>(S::API_VERSION, "InitConfiguration");
        self.register::<JoinConfiguration<S>>(S::API_VERSION, "JoinConfiguration");
    }
}

/// Process-wide registry, built once on first use and read-only afterwards.
pub static SCHEME: LazyLock<Scheme> = LazyLock::new(|| {
    let mut scheme = Scheme::new();
    scheme.add_kubeadm::<V1Beta3>();
    scheme.add_kubeadm::<V1Beta4>();
    scheme.register::<KubeletConfiguration>(KUBELET_API_VERSION, "KubeletConfiguration");
    scheme
});

/// Renders registered objects as a multi-document YAML stream.
///
/// Keys are sorted at every level and empty fields are dropped, matching
/// what the upstream kubectl printer produces.
#[derive(Debug)]
pub struct YamlPrinter<'a> {
    scheme: &'a Scheme,
    documents: Vec<String>,
}

impl Default for YamlPrinter<'static> {
    fn default() -> Self {
        Self::new(&SCHEME)
    }
}

impl<'a> YamlPrinter<'a> {
    #[must_use]
    pub fn new(scheme: &'a Scheme) -> Self {
        Self {
            scheme,
            documents: Vec::new(),
        }
    }

    /// Append one object as its own document.
    ///
    /// # Errors
    ///
    /// Fails if the type is not registered or cannot be encoded.
    pub fn print<T: Serialize + 'static>(&mut self, object: &T) -> Result<&mut Self> {
        let gvk = self.scheme.kind_for::<T>()?;

        let mut value = serde_json::to_value(object)?;
        if let JsonValue::Object(map) = &mut value {
            map.insert("apiVersion".into(), JsonValue::from(gvk.api_version));
            map.insert("kind".into(), JsonValue::from(gvk.kind));
        }

        self.documents
            .push(serde_yaml::to_string(&canonical(value))?);
        Ok(self)
    }

    /// Join the printed documents with `---` separators.
    #[must_use]
    pub fn finish(self) -> String {
        self.documents.join("---\n")
    }
}

fn canonical(value: JsonValue) -> YamlValue {
    match value {
        JsonValue::Null => YamlValue::Null,
        JsonValue::Bool(b) => YamlValue::Bool(b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                YamlValue::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                YamlValue::Number(u.into())
            } else {
                YamlValue::Number(n.as_f64().unwrap_or_default().into())
            }
        }
        JsonValue::String(s) => YamlValue::String(s),
        JsonValue::Array(items) => YamlValue::Sequence(items.into_iter().map(canonical).collect()),
        JsonValue::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut mapping = Mapping::with_capacity(entries.len());
            for (key, value) in entries {
                mapping.insert(YamlValue::String(key), canonical(value));
            }
            YamlValue::Mapping(mapping)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Unknown {
        field: String,
    }

    #[test]
    fn test_registry_covers_both_generations() {
        let legacy = SCHEME.kind_for::<InitConfiguration<V1Beta3>>().unwrap();
        assert_eq!(legacy.api_version, "kubeadm.k8s.io/v1beta3");
        assert_eq!(legacy.kind, "InitConfiguration");

        let current = SCHEME.kind_for::<JoinConfiguration<V1Beta4>>().unwrap();
        assert_eq!(current.api_version, "kubeadm.k8s.io/v1beta4");

        let kubelet = SCHEME.kind_for::<KubeletConfiguration>().unwrap();
        assert_eq!(kubelet.api_version, KUBELET_API_VERSION);
    }

    #[test]
    fn test_unregistered_type_is_rejected() {
        let mut printer = YamlPrinter::default();
        let err = printer
            .print(&Unknown {
                field: "x".into(),
            })
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnregisteredKind(_)));
    }

    #[test]
    fn test_documents_are_tagged_and_separated() {
        let mut cluster = ClusterConfiguration::<V1Beta3>::default();
        cluster.kubernetes_version = "v1.30.11".into();
        let kubelet = KubeletConfiguration {
            cgroup_driver: "systemd".into(),
            ..KubeletConfiguration::default()
        };

        let mut printer = YamlPrinter::default();
        printer.print(&cluster).unwrap().print(&kubelet).unwrap();
        let out = printer.finish();

        let docs: Vec<&str> = out.split("---\n").collect();
        assert_eq!(docs.len(), 2);
        assert!(!out.starts_with("---"));
        assert_eq!(
            docs[0],
            "apiVersion: kubeadm.k8s.io/v1beta3\nkind: ClusterConfiguration\nkubernetesVersion: v1.30.11\n"
        );
        assert!(docs[1].starts_with("apiVersion: kubelet.config.k8s.io/v1beta1\ncgroupDriver: systemd\nkind: KubeletConfiguration\n"));
    }

    #[test]
    fn test_user_supplied_kind_is_overwritten() {
        let mut cluster = ClusterConfiguration::<V1Beta4>::default();
        cluster
            .extra
            .insert("apiVersion".into(), JsonValue::from("kubeadm.k8s.io/v1beta3"));

        let mut printer = YamlPrinter::default();
        printer.print(&cluster).unwrap();
        let out = printer.finish();
        assert!(out.contains("apiVersion: kubeadm.k8s.io/v1beta4"));
        assert!(!out.contains("v1beta3"));
    }
}

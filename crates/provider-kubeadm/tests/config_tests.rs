//! Normalizer round trips through the public configuration types.

use pretty_assertions::assert_eq;
use provider_kubeadm::defaults::{mutate_cluster_defaults, mutate_kubelet_defaults};
use provider_kubeadm::kubeadm::{Config, KubeadmConfig, V1Beta3, V1Beta4};
use provider_kubeadm::ApiSchema;

const OPTIONS: &str = r"
clusterConfiguration:
  clusterName: edge
  kubernetesVersion: v1.31.2
  networking:
    podSubnet: 192.168.0.0/16
    serviceSubnet: 10.100.0.0/16
  apiServer:
    certSANs: [10.0.0.1, lb.example.com]
    extraArgs:
      - name: audit-log-maxage
        value: '30'
  etcd:
    local:
      dataDir: /var/lib/etcd
initConfiguration:
  nodeRegistration:
    kubeletExtraArgs:
      - name: node-ip
        value: 10.0.0.7
kubeletConfiguration:
  maxPods: 200
  clusterDomain: corp.local
";

#[test]
fn test_defaulted_config_round_trips() {
    let Config::Current(mut cfg) = Config::parse(ApiSchema::Current, OPTIONS) else {
        panic!("expected the current schema");
    };
    mutate_cluster_defaults(&mut cfg.cluster, "10.0.0.1");
    mutate_kubelet_defaults(&mut cfg.kubelet, "10.100.0.0/16", false);

    let yaml = serde_yaml::to_string(&serde_json::json!({
        "clusterConfiguration": cfg.cluster,
        "initConfiguration": cfg.init,
        "kubeletConfiguration": cfg.kubelet,
    }))
    .unwrap();
    let back = KubeadmConfig::<V1Beta4>::from_options(&yaml);

    assert_eq!(back.cluster, cfg.cluster);
    assert_eq!(back.init, cfg.init);
    assert_eq!(back.kubelet, cfg.kubelet);

    assert_eq!(back.cluster.api_server.cert_sans, vec!["10.0.0.1", "lb.example.com"]);
    assert_eq!(back.cluster.extra["clusterName"], "edge");
    assert!(back.cluster.extra.contains_key("etcd"));
    assert_eq!(back.kubelet.cluster_domain, "corp.local");
    assert_eq!(back.kubelet.cluster_dns, Some(vec!["10.100.0.10".to_string()]));
}

#[test]
fn test_cluster_defaults_are_idempotent() {
    let mut once = KubeadmConfig::<V1Beta3>::from_options(OPTIONS).cluster;
    mutate_cluster_defaults(&mut once, "10.0.0.1");
    let mut twice = once.clone();
    mutate_cluster_defaults(&mut twice, "10.0.0.1");

    assert_eq!(once, twice);
    assert_eq!(once.control_plane_endpoint, "10.0.0.1:6443");
}

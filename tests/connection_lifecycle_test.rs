// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
mod common;

use std::time::{Duration, SystemTime};

use common::{fresh_identity, MockCluster};
use remote_slurm::jump::TunnelStage;
use remote_slurm::ssh::ssh_config::EmptyStore;
use remote_slurm::ssh::{ConnectionRequest, ConnectionState, SshConnection};
use remote_slurm::telemetry::{RecordedEvent, RecordingObserver};
use remote_slurm::RemoteError;

fn connection(cluster: &std::sync::Arc<MockCluster>, request: ConnectionRequest) -> SshConnection {
    SshConnection::resolve(request, &EmptyStore, cluster.connector()).unwrap()
}

#[tokio::test]
async fn test_missing_identity_never_connects() {
    let cluster = MockCluster::new();
    let request = ConnectionRequest::new("cluster")
        .with_username("alice")
        .with_identity_file("/nonexistent/id_ed25519");
    let mut conn = connection(&cluster, request);

    let err = conn.ensure_connected().await.unwrap_err();
    assert!(matches!(err, RemoteError::MissingCredential { .. }), "{err:?}");
    assert!(cluster.connects().is_empty());
    assert_eq!(conn.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_expired_identity_never_connects() {
    let cluster = MockCluster::new();
    let (_dir, key) = fresh_identity();
    let old = SystemTime::now() - Duration::from_secs(48 * 3600);
    std::fs::File::options()
        .write(true)
        .open(&key)
        .unwrap()
        .set_modified(old)
        .unwrap();

    let request = ConnectionRequest::new("cluster")
        .with_username("alice")
        .with_identity_file(&key);
    let mut conn = connection(&cluster, request);

    let err = conn.run("hostname", None).await.unwrap_err();
    assert!(matches!(err, RemoteError::ExpiredCredential { .. }), "{err:?}");
    assert!(cluster.connects().is_empty());
}

#[tokio::test]
async fn test_ensure_connected_twice_connects_once() {
    let cluster = MockCluster::new();
    let (_dir, key) = fresh_identity();
    let request = ConnectionRequest::new("cluster")
        .with_username("alice")
        .with_identity_file(&key);
    let mut conn = connection(&cluster, request);

    conn.ensure_connected().await.unwrap();
    conn.ensure_connected().await.unwrap();

    assert_eq!(cluster.connects(), vec!["cluster"]);
    assert!(conn.is_connected());
    assert_eq!(conn.state(), ConnectionState::Connected);
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let cluster = MockCluster::new();
    let (_dir, key) = fresh_identity();
    let observer = RecordingObserver::new();
    let request = ConnectionRequest::new("cluster")
        .with_username("alice")
        .with_identity_file(&key);

    // Never opened
    let mut idle = connection(&cluster, request.clone()).with_observer(observer.clone());
    idle.close().await;
    idle.close().await;
    assert_eq!(observer.count(|e| *e == RecordedEvent::Disconnected), 0);

    let mut conn = connection(&cluster, request).with_observer(observer.clone());
    conn.ensure_connected().await.unwrap();
    conn.close().await;
    conn.close().await;

    assert_eq!(observer.count(|e| *e == RecordedEvent::Disconnected), 1);
    assert_eq!(cluster.disconnects(), 1);
    assert!(!conn.is_connected());
    assert_eq!(conn.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_stale_session_is_replaced() {
    let cluster = MockCluster::new();
    let (_dir, key) = fresh_identity();
    let observer = RecordingObserver::new();
    let request = ConnectionRequest::new("cluster")
        .with_username("alice")
        .with_identity_file(&key);
    let mut conn = connection(&cluster, request).with_observer(observer.clone());

    conn.ensure_connected().await.unwrap();
    cluster.drop_sessions();
    assert!(!conn.is_connected());

    let output = conn.run("hostname", None).await.unwrap();
    assert!(output.is_success());

    assert_eq!(cluster.connects().len(), 2);
    assert_eq!(cluster.disconnects(), 1);
    assert_eq!(observer.count(|e| *e == RecordedEvent::SessionStale), 1);
    assert_eq!(observer.count(|e| *e == RecordedEvent::Connected), 2);
}

#[tokio::test]
async fn test_jump_failure_fails_closed() {
    let cluster = MockCluster::new();
    cluster.make_unreachable("bastion");
    let (_dir, key) = fresh_identity();
    let request = ConnectionRequest::new("cluster")
        .with_username("alice")
        .with_identity_file(&key)
        .with_jump("ops@bastion:2222");
    let mut conn = connection(&cluster, request);

    let err = conn.ensure_connected().await.unwrap_err();
    match err {
        RemoteError::ConnectionFailed { host, stage, .. } => {
            assert_eq!(host, "bastion");
            assert_eq!(stage, TunnelStage::Jump);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(cluster.connects(), vec!["bastion"]);
    assert!(cluster.forwards().is_empty());
}

#[tokio::test]
async fn test_jump_tunnel_stages() {
    let cluster = MockCluster::new();
    let (_dir, key) = fresh_identity();
    let observer = RecordingObserver::new();
    let request = ConnectionRequest::new("cluster")
        .with_username("alice")
        .with_identity_file(&key)
        .with_port(2200)
        .with_jump("ops@bastion");
    let mut conn = connection(&cluster, request).with_observer(observer.clone());

    conn.ensure_connected().await.unwrap();

    assert_eq!(cluster.connects(), vec!["bastion", "cluster"]);
    assert_eq!(cluster.forwards(), vec!["cluster:2200"]);
    let stages: Vec<_> = observer
        .events()
        .into_iter()
        .filter_map(|e| match e {
            RecordedEvent::StageStarted(stage) => Some(stage),
            _ => None,
        })
        .collect();
    assert_eq!(
        stages,
        vec![TunnelStage::Jump, TunnelStage::Forward, TunnelStage::Target]
    );

    // Target and jump transports are both released
    conn.close().await;
    assert_eq!(cluster.disconnects(), 2);
}

#[tokio::test]
async fn test_forward_failure_releases_jump() {
    let cluster = MockCluster::new();
    cluster.refuse_forwarding();
    let (_dir, key) = fresh_identity();
    let request = ConnectionRequest::new("cluster")
        .with_username("alice")
        .with_identity_file(&key)
        .with_jump("bastion");
    let mut conn = connection(&cluster, request);

    let err = conn.ensure_connected().await.unwrap_err();
    assert!(
        matches!(
            err,
            RemoteError::ConnectionFailed {
                stage: TunnelStage::Forward,
                ..
            }
        ),
        "{err:?}"
    );
    assert_eq!(cluster.connects(), vec!["bastion"]);
    assert_eq!(cluster.disconnects(), 1);
}

#[tokio::test]
async fn test_target_failure_behind_jump() {
    let cluster = MockCluster::new();
    cluster.make_unreachable("cluster");
    let (_dir, key) = fresh_identity();
    let request = ConnectionRequest::new("cluster")
        .with_username("alice")
        .with_identity_file(&key)
        .with_jump("bastion");
    let mut conn = connection(&cluster, request);

    let err = conn.ensure_connected().await.unwrap_err();
    assert!(
        matches!(
            err,
            RemoteError::ConnectionFailed {
                stage: TunnelStage::Target,
                ..
            }
        ),
        "{err:?}"
    );
    assert_eq!(cluster.connects(), vec!["bastion", "cluster"]);
    assert_eq!(cluster.disconnects(), 1);
}

#[tokio::test]
async fn test_direct_failure_reports_direct_stage() {
    let cluster = MockCluster::new();
    cluster.make_unreachable("cluster");
    let (_dir, key) = fresh_identity();
    let request = ConnectionRequest::new("cluster")
        .with_username("alice")
        .with_identity_file(&key);
    let mut conn = connection(&cluster, request);

    let err = conn.check_connection().await.unwrap_err();
    assert!(
        matches!(
            err,
            RemoteError::ConnectionFailed {
                stage: TunnelStage::Direct,
                ..
            }
        ),
        "{err:?}"
    );
}

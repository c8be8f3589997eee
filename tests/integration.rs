//! End-to-end coordinator/agent session over real loopback TCP sockets:
//! three agent threads, one coordinator thread, driving ADD/SUB/MUL/CMP.

use std::net::TcpListener;
use std::thread;

use its_mpc::agent::Agent;
use its_mpc::coordinator::Coordinator;
use its_mpc::net::config::SessionConfig;

fn free_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}

/// Spawns three agent threads against `addr` and a coordinator on the test's
/// own thread, then runs `with_coordinator` against it before tearing the
/// session down. Blocks until every agent thread has exited.
fn with_session<T>(with_coordinator: impl FnOnce(&mut Coordinator<rand::rngs::ThreadRng>) -> T) -> T {
    let addr = free_addr();
    let config = SessionConfig::from_json(&format!(r#"{{ "listen_addr": "{addr}" }}"#)).unwrap();

    let agent_threads: Vec<_> = (0..3)
        .map(|_| {
            let dial: std::net::SocketAddr = addr.parse().unwrap();
            thread::spawn(move || {
                // The coordinator may not have bound yet; retry briefly.
                let mut last_err = None;
                for _ in 0..200 {
                    match Agent::connect(dial, None) {
                        Ok(mut agent) => return agent.serve(),
                        Err(e) => {
                            last_err = Some(e);
                            thread::sleep(std::time::Duration::from_millis(10));
                        }
                    }
                }
                Err(last_err.unwrap())
            })
        })
        .collect();

    let mut coordinator = Coordinator::bind(&config, rand::thread_rng()).unwrap();
    let result = with_coordinator(&mut coordinator);
    coordinator.close();

    for handle in agent_threads {
        handle.join().unwrap().unwrap();
    }
    result
}

#[test]
fn add_reconstructs_the_sum() {
    let result = with_session(|c| c.add(7, 5).unwrap());
    assert_eq!(result, 12);
}

#[test]
fn add_wraps_around_the_modulus() {
    let result = with_session(|c| c.add(10000, 500).unwrap());
    assert_eq!(result, 211);
}

#[test]
fn mul_reconstructs_the_product() {
    let result = with_session(|c| c.mul(13, 11).unwrap());
    assert_eq!(result, 143);
}

#[test]
fn mul_wraps_around_the_modulus() {
    let result = with_session(|c| c.mul(200, 300).unwrap());
    assert_eq!(result, (200u32 * 300) % its_mpc::field::MOD);
}

#[test]
fn sub_wraps_a_negative_result_into_the_field() {
    let result = with_session(|c| c.sub(5, 9).unwrap());
    assert_eq!(result, 10285);
}

#[test]
fn cmp_reports_equality() {
    let (c, e) = with_session(|coordinator| coordinator.cmp(42, 42).unwrap());
    assert!(c);
    assert!(e);
}

#[test]
fn cmp_reports_strictly_greater() {
    let (c, e) = with_session(|coordinator| coordinator.cmp(100, 7).unwrap());
    assert!(c);
    assert!(!e);
}

#[test]
fn cmp_reports_strictly_less() {
    let (c, e) = with_session(|coordinator| coordinator.cmp(7, 100).unwrap());
    assert!(!c);
    assert!(!e);
}

#[test]
fn derived_comparators_agree_with_cmp() {
    with_session(|coordinator| {
        assert!(coordinator.lt(3, 9).unwrap());
        assert!(!coordinator.gt(3, 9).unwrap());
        assert!(coordinator.le(9, 9).unwrap());
        assert!(coordinator.ge(9, 9).unwrap());
        assert!(coordinator.eq(9, 9).unwrap());
        assert!(!coordinator.ne(9, 9).unwrap());
    });
}

#[test]
fn full_session_runs_a_sequence_of_mixed_operations() {
    with_session(|coordinator| {
        assert_eq!(coordinator.add(1, 2).unwrap(), 3);
        assert_eq!(coordinator.mul(3, 4).unwrap(), 12);
        assert!(coordinator.lt(1, 100).unwrap());
        assert_eq!(coordinator.sub(10, 4).unwrap(), 6);
    });
}

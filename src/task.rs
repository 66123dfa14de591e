use crate::Result;
use std::{
    sync::mpsc::{self, Receiver},
    thread,
};

/// Runs `f` on a new thread and returns a receiver that yields its result once it finishes.
///
/// If `f` panics the receiver is disconnected without a value. Fails only if the thread cannot be spawned.
pub fn spawn_reporting<F, T, E>(f: F) -> Result<Receiver<std::result::Result<T, E>>>
where
    F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel(1);
    thread::Builder::new().name("task".to_string()).spawn(move || {
        // the caller may not care about the result
        let _ = tx.send(f());
    })?;
    Ok(rx)
}

#[cfg(test)]
mod tests {
    use super::spawn_reporting;
    use crate::{fingerprint, Relay};
    use std::{
        io::{self, Cursor},
        thread,
    };

    #[test]
    fn runs_on_a_named_thread() {
        let rx = spawn_reporting(|| -> Result<_, ()> { Ok(thread::current().name().map(str::to_owned)) }).unwrap();
        assert_eq!(rx.recv().unwrap(), Ok(Some("task".to_string())));
    }

    #[test]
    fn reports_success() {
        let rx = spawn_reporting(|| fingerprint(&b"abc"[..])).expect("failed to spawn task");
        assert_eq!(rx.recv().unwrap().unwrap(), "ba7816bf8f01cfea");
    }

    #[test]
    fn reports_failure() {
        let rx = spawn_reporting(|| -> Result<(), String> { Err("failed".to_string()) }).unwrap();
        assert_eq!(rx.recv().unwrap(), Err("failed".to_string()));
    }

    #[test]
    fn panics_disconnect() {
        let rx = spawn_reporting(|| -> Result<(), ()> { panic!("oh no") }).unwrap();
        assert!(rx.recv().is_err());
    }

    #[test]
    fn fingerprints_a_relay_in_the_background() {
        let relay = Relay::spawn(Cursor::new(b"abc".to_vec()), io::sink()).unwrap();
        let rx = spawn_reporting(move || fingerprint(relay)).unwrap();
        assert_eq!(rx.recv().unwrap().unwrap(), "ba7816bf8f01cfea");
    }
}

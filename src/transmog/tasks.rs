//! Cooperative tasks run from the game's frame update. Nothing here uses threads: the pool is
//! pumped once per frame and every task runs until it has to wait for something.

use std::{
    cell::{Cell, RefCell},
    future::Future,
    pin::Pin,
    rc::Rc,
    task::{Context, Poll, Waker},
};

use futures::{
    executor::{LocalPool, LocalSpawner},
    future::{abortable, AbortHandle},
    task::LocalSpawnExt,
};

struct TaskEntry {
    name: &'static str,
    abort: AbortHandle,
    done: Rc<Cell<bool>>,
}

pub struct Tasks {
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
    running: RefCell<Vec<TaskEntry>>,
    frame: Rc<Cell<u64>>,
    frame_waiters: Rc<RefCell<Vec<Waker>>>,
}

impl Default for Tasks {
    fn default() -> Self {
        Tasks::new()
    }
}

impl Tasks {
    pub fn new() -> Tasks {
        let pool = LocalPool::new();
        let spawner = pool.spawner();

        Tasks {
            pool: RefCell::new(pool),
            spawner,
            running: RefCell::new(vec![]),
            frame: Rc::new(Cell::new(0)),
            frame_waiters: Rc::new(RefCell::new(vec![])),
        }
    }

    /// Starts `future` on the pool. It will first be polled on the next pump.
    pub fn spawn(&self, name: &'static str, future: impl Future<Output = ()> + 'static) {
        let (future, abort) = abortable(future);
        let done = Rc::new(Cell::new(false));
        let done_flag = done.clone();

        let spawned = self.spawner.spawn_local(async move {
            if future.await.is_err() {
                log::debug!("Task '{name}' was cancelled");
            }

            done_flag.set(true);
        });

        if let Err(err) = spawned {
            log::error!("Unable to start task '{name}': {err}");
            return;
        }

        let mut running = self.running.borrow_mut();
        running.retain(|task| !task.done.get());
        running.push(TaskEntry { name, abort, done });
    }

    /// Stops every task that hasn't finished yet. A cancelled task's future is never resumed; it
    /// is dropped, along with everything it holds, on the next pump.
    pub fn cancel_all(&self) {
        let running: Vec<TaskEntry> = self.running.borrow_mut().drain(..).collect();

        for task in running.into_iter().filter(|task| !task.done.get()) {
            log::info!("Cancelling task '{}'", task.name);
            task.abort.abort();
        }
    }

    /// Runs every task that can make progress. Called once per frame.
    pub fn pump(&self) {
        self.frame.set(self.frame.get() + 1);

        let waiters: Vec<Waker> = self.frame_waiters.borrow_mut().drain(..).collect();

        for waker in waiters {
            waker.wake();
        }

        match self.pool.try_borrow_mut() {
            Ok(mut pool) => pool.run_until_stalled(),
            Err(_) => log::error!("Task pool pumped from inside a task"),
        }
    }

    /// The number of tasks that have been started and haven't finished or been cancelled.
    pub fn in_flight(&self) -> usize {
        self.running
            .borrow()
            .iter()
            .filter(|task| !task.done.get())
            .count()
    }

    /// A future that finishes on the first pump after it was created.
    pub fn next_frame(&self) -> NextFrame {
        NextFrame {
            target: self.frame.get() + 1,
            frame: self.frame.clone(),
            waiters: self.frame_waiters.clone(),
        }
    }
}

pub struct NextFrame {
    target: u64,
    frame: Rc<Cell<u64>>,
    waiters: Rc<RefCell<Vec<Waker>>>,
}

impl Future for NextFrame {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.frame.get() >= self.target {
            return Poll::Ready(());
        }

        self.waiters.borrow_mut().push(cx.waker().clone());
        Poll::Pending
    }
}

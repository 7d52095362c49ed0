//! Caixa de entrada compartilhada entre a thread MQTT e o refresh loop.
//!
//! A thread de rede só faz [`Inbox::push`]; o refresh loop só faz
//! [`Inbox::drain_one`]. Todo acesso à fila passa pelo mesmo mutex, então
//! nenhum registro é perdido, duplicado ou lido pela metade.
//!
//! A fila é limitada: com a capacidade cheia, o registro mais antigo é
//! descartado para abrir espaço ao novo (drop-oldest).

use crate::record::AlertRecord;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::debug;

/// Capacidade padrão da fila.
pub const DEFAULT_INBOX_CAPACITY: usize = 256;

#[derive(Debug)]
struct Queue {
    records: VecDeque<AlertRecord>,
    dropped: u64,
}

/// Fila FIFO limitada e thread-safe de [`AlertRecord`].
#[derive(Debug)]
pub struct Inbox {
    queue: Mutex<Queue>,
    capacity: usize,
}

impl Inbox {
    /// Cria uma fila com a capacidade dada (mínimo 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            queue: Mutex::new(Queue {
                records: VecDeque::with_capacity(capacity.min(DEFAULT_INBOX_CAPACITY)),
                dropped: 0,
            }),
            capacity,
        }
    }

    /// Enfileira um registro. Se a fila estava cheia, retorna o registro
    /// mais antigo, que foi descartado.
    pub fn push(&self, record: AlertRecord) -> Option<AlertRecord> {
        let mut queue = self.queue.lock();
        let evicted = if queue.records.len() >= self.capacity {
            queue.dropped += 1;
            queue.records.pop_front()
        } else {
            None
        };
        queue.records.push_back(record);

        if evicted.is_some() {
            debug!(
                "Inbox cheia ({}), descartando alerta mais antigo (total descartado: {})",
                self.capacity, queue.dropped
            );
        }
        evicted
    }

    /// Remove e retorna o registro mais antigo, se houver.
    pub fn drain_one(&self) -> Option<AlertRecord> {
        self.queue.lock().records.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total de registros descartados por overflow desde a criação.
    pub fn dropped(&self) -> u64 {
        self.queue.lock().dropped
    }
}

impl Default for Inbox {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_INBOX_CAPACITY)
    }
}

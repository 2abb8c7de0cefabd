//! Vertex buffer pool for chunk mesh uploads.
//!
//! Chunks remesh constantly while streaming, so buffers are recycled
//! through size-class buckets instead of being created and destroyed per
//! upload. Meshes are non-indexed triangle lists; only vertex buffers are
//! pooled.

/// Number of size classes in the pool.
const NUM_SIZE_CLASSES: usize = 6;

/// Size class thresholds in bytes: 4 KB, 8 KB, 16 KB, 32 KB, 64 KB, 128 KB.
const SIZE_CLASSES: [u64; NUM_SIZE_CLASSES] = [4096, 8192, 16384, 32768, 65536, 131072];

/// Pseudo-class for requests above the largest threshold. A dense chunk of
/// non-indexed geometry can exceed 128 KB of vertices; such buffers are
/// created at exact need, never recycled through a free list, and dropped
/// on release.
pub const OVERSIZE_CLASS: usize = NUM_SIZE_CLASSES;

/// A pool of vertex buffers bucketed by size class, with byte accounting.
pub struct VertexBufferPool {
    free: [Vec<wgpu::Buffer>; NUM_SIZE_CLASSES],
    total_allocated: u64,
    in_use: u64,
}

impl VertexBufferPool {
    pub fn new() -> Self {
        Self {
            free: Default::default(),
            total_allocated: 0,
            in_use: 0,
        }
    }

    /// Index of the smallest size class holding `min_size` bytes, or
    /// [`OVERSIZE_CLASS`] when `min_size` exceeds every threshold.
    pub fn size_class_for(min_size: u64) -> usize {
        SIZE_CLASSES
            .iter()
            .position(|&s| s >= min_size)
            .unwrap_or(OVERSIZE_CLASS)
    }

    /// Byte size of a given size class.
    pub fn class_size(class: usize) -> u64 {
        SIZE_CLASSES[class.min(NUM_SIZE_CLASSES - 1)]
    }

    /// Acquire a buffer of at least `min_size` bytes: pooled if one is
    /// free in the class, freshly created otherwise. Requests above the
    /// largest class get a dedicated [`OVERSIZE_CLASS`] buffer sized to
    /// the request.
    pub fn acquire(&mut self, device: &wgpu::Device, min_size: u64) -> (wgpu::Buffer, usize) {
        let class = Self::size_class_for(min_size);
        if class == OVERSIZE_CLASS {
            let size = min_size.next_power_of_two();
            let buf = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("oversize-chunk-vertex-buffer"),
                size,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.total_allocated += size;
            self.in_use += size;
            return (buf, OVERSIZE_CLASS);
        }
        let size = SIZE_CLASSES[class];

        if let Some(buf) = self.free[class].pop() {
            self.in_use += size;
            return (buf, class);
        }

        let buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pooled-chunk-vertex-buffer"),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.total_allocated += size;
        self.in_use += size;
        (buf, class)
    }

    /// Return a buffer to its class bucket for reuse. Oversize buffers are
    /// dropped and their bytes retired from the accounting.
    pub fn release(&mut self, buffer: wgpu::Buffer, size_class: usize) {
        if size_class == OVERSIZE_CLASS {
            self.in_use = self.in_use.saturating_sub(buffer.size());
            self.total_allocated = self.total_allocated.saturating_sub(buffer.size());
            return;
        }
        let class = size_class.min(NUM_SIZE_CLASSES - 1);
        self.in_use = self.in_use.saturating_sub(SIZE_CLASSES[class]);
        self.free[class].push(buffer);
    }

    /// Bytes currently held by active meshes.
    pub fn bytes_in_use(&self) -> u64 {
        self.in_use
    }

    /// Bytes allocated in total, pooled free buffers included.
    pub fn bytes_allocated(&self) -> u64 {
        self.total_allocated
    }

    /// Number of free buffers across all size classes.
    pub fn free_buffer_count(&self) -> usize {
        self.free.iter().map(Vec::len).sum()
    }
}

impl Default for VertexBufferPool {
    fn default() -> Self {
        Self::new()
    }
}

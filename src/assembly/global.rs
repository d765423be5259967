use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

/// Assembles element matrices into a global CSR matrix.
///
/// Each item pairs the global node indices of an element with its element matrix of size
/// `(n * solution_dim) x (n * solution_dim)`, whose local degree of freedom
/// `solution_dim * i + d` maps to global degree of freedom `solution_dim * nodes[i] + d`.
/// Duplicate entries are summed.
pub fn assemble_element_matrices<'a, I>(num_nodes: usize, solution_dim: usize, element_matrices: I) -> CsrMatrix<f64>
where
    I: IntoIterator<Item = (&'a [usize], DMatrix<f64>)>,
{
    let s = solution_dim;
    let num_dofs = s * num_nodes;
    let mut coo = CooMatrix::new(num_dofs, num_dofs);
    for (nodes, matrix) in element_matrices {
        assert_eq!(
            matrix.nrows(),
            s * nodes.len(),
            "Element matrix dimensions must match node count and solution dim"
        );
        for (i_local, &i_node) in nodes.iter().enumerate() {
            for (j_local, &j_node) in nodes.iter().enumerate() {
                for a in 0..s {
                    for b in 0..s {
                        let value = matrix[(s * i_local + a, s * j_local + b)];
                        if value != 0.0 {
                            coo.push(s * i_node + a, s * j_node + b, value);
                        }
                    }
                }
            }
        }
    }
    CsrMatrix::from(&coo)
}

//! SQL statements issued by the cart store.

/// Creates the per-user cart row if it does not exist yet.
pub(crate) const ENSURE_CART: &str = r"
INSERT INTO carts (user_id)
VALUES ($1)
ON CONFLICT (user_id) DO NOTHING
";

/// Inserts a line item, accumulating quantity on a (user, item) conflict.
pub(crate) const UPSERT_ITEM: &str = r"
INSERT INTO cart_items (user_id, item_id, quantity)
VALUES ($1, $2, $3)
ON CONFLICT (user_id, item_id)
DO UPDATE SET
    quantity   = cart_items.quantity + EXCLUDED.quantity,
    updated_at = NOW()
RETURNING id
";

pub(crate) const DELETE_ITEM: &str = r"
DELETE FROM cart_items
WHERE user_id = $1 AND item_id = $2
";

pub(crate) const SELECT_ITEMS: &str = r"
SELECT item_id, quantity
FROM cart_items
WHERE user_id = $1
ORDER BY item_id
";

pub(crate) const COUNT_ITEMS: &str = r"
SELECT COUNT(*) FROM cart_items WHERE user_id = $1
";

/// `SUM` over no rows is `NULL`; coalesce so an empty cart totals zero.
pub(crate) const SUM_QUANTITY: &str = r"
SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM cart_items WHERE user_id = $1
";

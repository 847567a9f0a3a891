/*!

This is the long-form manual for `counterbalance` and `studyrun`.

## The study record

A study bundles a procedure plan (the ordered list of steps the experimenter
walks through with each participant), the independent variables (what is
manipulated), the dependent variables (what is measured) and two counters:
the derived number of participants needed and the number of participants
already run.

Steps with a positive `is_condition` marker are *condition slots*: the
points in the session where one combination of variable levels is
administered. The library keeps the number of slots synchronized with the
variables via [reconcile_plan](crate::reconcile_plan): the slot count is the
product of the level counts of all within-subject variables (a variable
without levels counts as 1).

## Balancing strategies

Each within-subject variable carries one of four strategies that decide the
level order a given participant sees:

### `none`

The levels in their insertion order, identical for every participant. Use
this when ordering effects are known to be irrelevant.

### `latin`

Row of the plain cyclic Latin square: participant `p` sees the levels
rotated by `p`. Every level appears once in every slot position across `n`
participants, but successor pairs repeat (`A` is always followed by `B`).

### `balanced`

The balanced Latin square of Bradley (1958). Across a block of `n`
participants (even `n`) every level is immediately preceded by every other
level exactly once, which distributes first-order carryover effects evenly.
Odd level counts need `2n` participants: every second participant sees the
mirrored row.

### `complete`

Complete counterbalancing: participant `p` sees permutation `p mod n!` of
the levels in lexicographic order. Exhaustive, but the participant count
grows factorially; more than 20 levels is rejected outright.

## Between-subject variables

A between-subject variable never multiplies the slot count. Participant `p`
is assigned level `p mod n` and sees it at every step of the session; the
assignment sequence repeats that one value once per plan step so a value can
be read off next to any slot.

## The study file

`studyrun` reads a study as a JSON document with camelCase field names:

```json
{
    "id": "V1StGXR",
    "name": "Menu layout study",
    "status": "preparation",
    "participantsNeeded": 0,
    "participantsDone": 0,
    "procedurePlan": [
        { "id": "a1", "title": "Welcome", "estimatedTime": 5,
          "checklist": ["Greet the participant"], "isCondition": 0 }
    ],
    "IV": [
        { "id": "b2", "name": "layout", "levels": ["list", "grid"],
          "balancing": "balanced", "design": "within" }
    ],
    "DV": [
        { "id": "c3", "name": "task time", "measures": ["seconds"] }
    ]
}
```

Unknown fields are ignored. `balancing` must be one of `none`, `latin`,
`balanced`, `complete`; `design` one of `within`, `between`; `status` one of
`preparation`, `pilot`, `conduct`, `done`.

*/
